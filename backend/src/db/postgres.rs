use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{connections, users, SocialStore, StoreError};
use crate::models::{CanonicalPair, Connection, ConnectionWithUser, NewUser, User, UserPublic};

/// Postgres-backed store. Cross-request coordination relies entirely on the
/// constraints declared in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        users::create_user(&self.pool, &user).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        users::get_user_by_id(&self.pool, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        users::get_user_by_email(&self.pool, email).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        users::get_user_by_username(&self.pool, username).await
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        users::update_display_name(&self.pool, id, display_name, updated_at).await
    }

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<UserPublic>, StoreError> {
        users::search_users(&self.pool, query, limit).await
    }

    async fn insert_connection(&self, connection: &Connection) -> Result<(), StoreError> {
        connections::create_connection(&self.pool, connection).await
    }

    async fn get_connection(&self, pair: CanonicalPair) -> Result<Option<Connection>, StoreError> {
        connections::get_connection(&self.pool, pair).await
    }

    async fn accept_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        connections::accept_connection(&self.pool, requester_id, addressee_id, updated_at).await
    }

    async fn delete_pending_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> Result<u64, StoreError> {
        connections::delete_pending_connection(&self.pool, requester_id, addressee_id).await
    }

    async fn delete_accepted_connection(&self, pair: CanonicalPair) -> Result<u64, StoreError> {
        connections::delete_accepted_connection(&self.pool, pair).await
    }

    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        connections::get_accepted_connections(&self.pool, user_id).await
    }

    async fn list_pending_incoming(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        connections::get_pending_incoming(&self.pool, user_id).await
    }
}
