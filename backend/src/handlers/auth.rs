use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use super::extract::json_body;
use crate::error::AppResult;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let req = json_body(payload)?;

    let user = state.identities.register(req, &state.auth).await?;
    let token = state.auth.issue_token(user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: user.to_auth(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let req = json_body(payload)?;

    let user = state.identities.authenticate(req, &state.auth).await?;
    let token = state.auth.issue_token(user.id, &user.email)?;

    Ok(Json(LoginResponse {
        token,
        user: user.to_auth(),
    }))
}
