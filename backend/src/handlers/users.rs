use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Json,
};
use serde::Deserialize;

use super::extract::{json_body, AuthUser};
use crate::error::AppResult;
use crate::models::{SuccessResponse, UpdateProfileRequest, UserAuth, UserPublic};
use crate::state::AppState;
use crate::utils::validation::{parse_id, parse_search_limit};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

pub async fn get_current_user(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserAuth>> {
    let user = state.identities.get_user(identity.user_id).await?;
    Ok(Json(user.to_auth()))
}

/// Public view only: another user's email is never exposed.
pub async fn get_user_by_id(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserPublic>> {
    let user_id = parse_id(&id, "user")?;
    let user = state.identities.get_user(user_id).await?;
    Ok(Json(user.to_public()))
}

pub async fn update_profile(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse<UserAuth>>> {
    let req = json_body(payload)?;

    let user = state
        .identities
        .update_profile(identity.user_id, &req.display_name)
        .await?;

    Ok(Json(SuccessResponse::with_data(
        "Profile updated successfully",
        user.to_auth(),
    )))
}

pub async fn search_users(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<UserPublic>>> {
    let limit = parse_search_limit(params.limit.as_deref())?;
    let query = params.q.unwrap_or_default();

    let users = state.search.search(&query, limit).await?;
    Ok(Json(users))
}
