use axum::{
    extract::{rejection::JsonRejection, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};

use crate::error::{codes, AppError, AppResult};
use crate::services::Identity;
use crate::state::AppState;

/// Caller identity resolved from `Authorization: Bearer <token>`.
///
/// Rejects with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A header that is not valid ASCII is malformed, not missing.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default());

        state.auth.authenticate_header(header).map(AuthUser)
    }
}

/// Unwrap a JSON body, turning axum's rejection into a structured 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(codes::INVALID_REQUEST, rejection.body_text()))
}
