//! Storage layer.
//!
//! Every backend implements [`SocialStore`]. Uniqueness of emails, usernames
//! and connection pairs is enforced here, inside the store, so that racing
//! writers cannot both succeed no matter what the services checked first.

pub mod connection;
pub mod connections;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod users;

pub use connection::{get_db_pool, DatabaseConfig};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CanonicalPair, Connection, ConnectionWithUser, NewUser, User, UserPublic};

pub type DynStore = Arc<dyn SocialStore>;

/// Which uniqueness rule a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Email,
    Username,
    ConnectionPair,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueKey::Email => f.write_str("email"),
            UniqueKey::Username => f.write_str("username"),
            UniqueKey::ConnectionPair => f.write_str("connection pair"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueKey),

    #[error("referenced user does not exist")]
    ForeignKeyViolation,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                if let Some(key) = db_err.constraint().and_then(unique_key_for_constraint) {
                    return StoreError::UniqueViolation(key);
                }
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation;
            }
        }
        StoreError::Database(err)
    }
}

/// Maps constraint names from `migrations/` to the rule they enforce.
fn unique_key_for_constraint(name: &str) -> Option<UniqueKey> {
    match name {
        "users_email_unique" => Some(UniqueKey::Email),
        "users_username_unique" => Some(UniqueKey::Username),
        "user_connections_pair_unique" | "user_connections_direction_unique" => {
            Some(UniqueKey::ConnectionPair)
        }
        _ => None,
    }
}

/// Persistence for user records and connection edges.
///
/// Mutations that may match nothing return the number of affected rows;
/// callers decide what zero means.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Insert a user. Fails with `UniqueViolation` on a taken email or username.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Users whose username or display name contains `query`, ignoring case.
    ///
    /// A backend may truncate to `limit` only if it orders rows exactly as
    /// `services::search::compare_matches` does.
    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<UserPublic>, StoreError>;

    /// Insert a new edge. Fails with `UniqueViolation(ConnectionPair)` if any
    /// edge already exists for the same unordered pair.
    async fn insert_connection(&self, connection: &Connection) -> Result<(), StoreError>;

    /// The edge for the pair, whichever side requested it.
    async fn get_connection(&self, pair: CanonicalPair) -> Result<Option<Connection>, StoreError>;

    /// Move the pending edge `requester -> addressee` to accepted.
    async fn accept_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Delete the pending edge `requester -> addressee`.
    async fn delete_pending_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> Result<u64, StoreError>;

    /// Delete the accepted edge for the pair, whichever side requested it.
    async fn delete_accepted_connection(&self, pair: CanonicalPair) -> Result<u64, StoreError>;

    /// Accepted edges touching `user_id`, ordered by the other party's display name.
    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError>;

    /// Pending edges addressed to `user_id`, newest first.
    async fn list_pending_incoming(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_names_map_to_keys() {
        assert_eq!(unique_key_for_constraint("users_email_unique"), Some(UniqueKey::Email));
        assert_eq!(unique_key_for_constraint("users_username_unique"), Some(UniqueKey::Username));
        assert_eq!(
            unique_key_for_constraint("user_connections_direction_unique"),
            Some(UniqueKey::ConnectionPair)
        );
        assert_eq!(
            unique_key_for_constraint("user_connections_pair_unique"),
            Some(UniqueKey::ConnectionPair)
        );
        assert_eq!(unique_key_for_constraint("users_pkey"), None);
    }
}
