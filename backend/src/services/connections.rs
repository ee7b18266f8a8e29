//! Connection-state machine.
//!
//! Per unordered pair {A, B}:
//!
//! ```text
//! NONE --send(A->B)--> PENDING(A->B) --accept(B,A)--> ACCEPTED --remove--> NONE
//!                            |
//!                            +--decline(B,A)--> NONE
//! ```
//!
//! Accept and decline match the exact requester/addressee direction. Existence
//! checks and removal use the canonical pair. An edge never returns to pending.

use chrono::Utc;
use uuid::Uuid;

use crate::db::{DynStore, StoreError, UniqueKey};
use crate::error::{codes, AppError, AppResult};
use crate::models::{CanonicalPair, Connection, ConnectionWithUser};

#[derive(Clone)]
pub struct ConnectionGraph {
    store: DynStore,
}

fn connection_exists() -> AppError {
    AppError::conflict(codes::CONNECTION_EXISTS, "Connection request already exists")
}

fn request_not_found() -> AppError {
    AppError::not_found(codes::REQUEST_NOT_FOUND, "Pending connection request not found")
}

impl ConnectionGraph {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// NONE -> PENDING(requester -> addressee).
    pub async fn send_request(&self, requester_id: Uuid, addressee_id: Uuid) -> AppResult<Connection> {
        if requester_id == addressee_id {
            return Err(AppError::validation(
                codes::INVALID_REQUEST,
                "Cannot send connection request to yourself",
            ));
        }

        if self.store.get_user_by_id(addressee_id).await?.is_none() {
            return Err(AppError::not_found(codes::USER_NOT_FOUND, "User not found"));
        }

        let pair = CanonicalPair::new(requester_id, addressee_id);
        if self.store.get_connection(pair).await?.is_some() {
            return Err(connection_exists());
        }

        let connection = Connection::pending(requester_id, addressee_id, Utc::now());
        match self.store.insert_connection(&connection).await {
            Ok(()) => {}
            // Lost a race against a concurrent request for the same pair.
            Err(StoreError::UniqueViolation(UniqueKey::ConnectionPair)) => {
                tracing::info!(
                    "Concurrent connection request {} -> {} lost the insert race",
                    requester_id,
                    addressee_id
                );
                return Err(connection_exists());
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Connection request {} sent: {} -> {}",
            connection.id,
            requester_id,
            addressee_id
        );
        Ok(connection)
    }

    /// PENDING(requester -> addressee) -> ACCEPTED. Only the addressee calls this.
    pub async fn accept_request(&self, addressee_id: Uuid, requester_id: Uuid) -> AppResult<()> {
        let affected = self
            .store
            .accept_connection(requester_id, addressee_id, Utc::now())
            .await?;
        if affected == 0 {
            return Err(request_not_found());
        }

        tracing::info!("Connection accepted: {} -> {}", requester_id, addressee_id);
        Ok(())
    }

    /// PENDING(requester -> addressee) -> NONE. Only the addressee calls this.
    pub async fn decline_request(&self, addressee_id: Uuid, requester_id: Uuid) -> AppResult<()> {
        let affected = self
            .store
            .delete_pending_connection(requester_id, addressee_id)
            .await?;
        if affected == 0 {
            return Err(request_not_found());
        }

        tracing::info!("Connection request declined: {} -> {}", requester_id, addressee_id);
        Ok(())
    }

    /// ACCEPTED -> NONE, from either side.
    pub async fn remove_connection(&self, user_id: Uuid, friend_id: Uuid) -> AppResult<()> {
        let affected = self
            .store
            .delete_accepted_connection(CanonicalPair::new(user_id, friend_id))
            .await?;
        if affected == 0 {
            return Err(AppError::not_found(codes::FRIENDSHIP_NOT_FOUND, "Friendship not found"));
        }

        tracing::info!("Connection removed between {} and {}", user_id, friend_id);
        Ok(())
    }

    pub async fn list_connections(&self, user_id: Uuid) -> AppResult<Vec<ConnectionWithUser>> {
        Ok(self.store.list_accepted_connections(user_id).await?)
    }

    pub async fn list_pending_incoming(&self, user_id: Uuid) -> AppResult<Vec<ConnectionWithUser>> {
        Ok(self.store.list_pending_incoming(user_id).await?)
    }
}
