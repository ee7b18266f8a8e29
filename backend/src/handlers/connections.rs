use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::extract::AuthUser;
use crate::error::AppResult;
use crate::models::{Connection, ConnectionWithUser, SuccessResponse};
use crate::state::AppState;
use crate::utils::validation::parse_id;

pub async fn send_request(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(addressee_id): Path<String>,
) -> AppResult<(StatusCode, Json<SuccessResponse<Connection>>)> {
    let addressee_id = parse_id(&addressee_id, "addressee")?;

    let connection = state.graph.send_request(identity.user_id, addressee_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            "Connection request sent successfully",
            connection,
        )),
    ))
}

pub async fn accept_request(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(requester_id): Path<String>,
) -> AppResult<Json<SuccessResponse<()>>> {
    let requester_id = parse_id(&requester_id, "requester")?;

    state.graph.accept_request(identity.user_id, requester_id).await?;

    Ok(Json(SuccessResponse::message("Connection request accepted successfully")))
}

pub async fn decline_request(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(requester_id): Path<String>,
) -> AppResult<Json<SuccessResponse<()>>> {
    let requester_id = parse_id(&requester_id, "requester")?;

    state.graph.decline_request(identity.user_id, requester_id).await?;

    Ok(Json(SuccessResponse::message("Connection request declined successfully")))
}

pub async fn remove_friend(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(friend_id): Path<String>,
) -> AppResult<Json<SuccessResponse<()>>> {
    let friend_id = parse_id(&friend_id, "friend")?;

    state.graph.remove_connection(identity.user_id, friend_id).await?;

    Ok(Json(SuccessResponse::message("Friendship removed successfully")))
}

pub async fn list_connections(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ConnectionWithUser>>> {
    Ok(Json(state.graph.list_connections(identity.user_id).await?))
}

pub async fn list_pending(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ConnectionWithUser>>> {
    Ok(Json(state.graph.list_pending_incoming(identity.user_id).await?))
}
