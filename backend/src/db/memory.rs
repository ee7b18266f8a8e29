//! In-process store used by the test suites.
//!
//! All state sits behind one lock, so each trait call is atomic and the
//! uniqueness rules hold exactly as the Postgres constraints make them hold.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SocialStore, StoreError, UniqueKey};
use crate::models::{
    CanonicalPair, Connection, ConnectionStatus, ConnectionWithUser, NewUser, User, UserPublic,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    // Keyed by the canonical pair: one edge per unordered pair.
    connections: HashMap<CanonicalPair, Connection>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn with_counterpart(&self, connection: &Connection, user_id: Uuid) -> Option<ConnectionWithUser> {
        self.users
            .get(&connection.counterpart(user_id))
            .map(|user| ConnectionWithUser {
                connection: connection.clone(),
                user: user.to_public(),
            })
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation(UniqueKey::Username));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(UniqueKey::Email));
        }

        let user = User {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.display_name = display_name.to_string();
                user.updated_at = updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn search_users(&self, query: &str, _limit: usize) -> Result<Vec<UserPublic>, StoreError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;

        Ok(state
            .users
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.display_name.to_lowercase().contains(&needle)
            })
            .map(User::to_public)
            .collect())
    }

    async fn insert_connection(&self, connection: &Connection) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&connection.requester_id)
            || !state.users.contains_key(&connection.addressee_id)
        {
            return Err(StoreError::ForeignKeyViolation);
        }

        let pair = connection.pair();
        if state.connections.contains_key(&pair) {
            return Err(StoreError::UniqueViolation(UniqueKey::ConnectionPair));
        }
        state.connections.insert(pair, connection.clone());

        Ok(())
    }

    async fn get_connection(&self, pair: CanonicalPair) -> Result<Option<Connection>, StoreError> {
        Ok(self.state.read().await.connections.get(&pair).cloned())
    }

    async fn accept_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let pair = CanonicalPair::new(requester_id, addressee_id);

        match state.connections.get_mut(&pair) {
            Some(conn)
                if conn.requester_id == requester_id
                    && conn.addressee_id == addressee_id
                    && conn.status == ConnectionStatus::Pending =>
            {
                conn.status = ConnectionStatus::Accepted;
                conn.updated_at = updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_pending_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let pair = CanonicalPair::new(requester_id, addressee_id);

        let matches = state.connections.get(&pair).is_some_and(|conn| {
            conn.requester_id == requester_id
                && conn.addressee_id == addressee_id
                && conn.status == ConnectionStatus::Pending
        });
        if matches {
            state.connections.remove(&pair);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn delete_accepted_connection(&self, pair: CanonicalPair) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;

        let matches = state
            .connections
            .get(&pair)
            .is_some_and(|conn| conn.status == ConnectionStatus::Accepted);
        if matches {
            state.connections.remove(&pair);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        let state = self.state.read().await;

        let mut rows: Vec<ConnectionWithUser> = state
            .connections
            .iter()
            .filter(|(pair, conn)| pair.contains(user_id) && conn.status == ConnectionStatus::Accepted)
            .filter_map(|(_, conn)| state.with_counterpart(conn, user_id))
            .collect();
        rows.sort_by(|a, b| {
            a.user
                .display_name
                .cmp(&b.user.display_name)
                .then_with(|| a.user.id.cmp(&b.user.id))
        });

        Ok(rows)
    }

    async fn list_pending_incoming(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        let state = self.state.read().await;

        let mut rows: Vec<ConnectionWithUser> = state
            .connections
            .values()
            .filter(|conn| conn.addressee_id == user_id && conn.status == ConnectionStatus::Pending)
            .filter_map(|conn| state.with_counterpart(conn, user_id))
            .collect();
        rows.sort_by(|a, b| {
            b.connection
                .created_at
                .cmp(&a.connection.created_at)
                .then_with(|| a.connection.id.cmp(&b.connection.id))
        });

        Ok(rows)
    }
}

/// Test wrapper that yields after every pre-check read, so futures joined on
/// one task all finish their reads before any of them writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct InterleavingStore {
    inner: MemoryStore,
}

#[cfg(test)]
impl InterleavingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl SocialStore for InterleavingStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.inner.insert_user(user).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.inner.get_user_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = self.inner.get_user_by_email(email).await;
        tokio::task::yield_now().await;
        user
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = self.inner.get_user_by_username(username).await;
        tokio::task::yield_now().await;
        user
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.inner.update_display_name(id, display_name, updated_at).await
    }

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<UserPublic>, StoreError> {
        self.inner.search_users(query, limit).await
    }

    async fn insert_connection(&self, connection: &Connection) -> Result<(), StoreError> {
        self.inner.insert_connection(connection).await
    }

    async fn get_connection(&self, pair: CanonicalPair) -> Result<Option<Connection>, StoreError> {
        let connection = self.inner.get_connection(pair).await;
        tokio::task::yield_now().await;
        connection
    }

    async fn accept_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.inner.accept_connection(requester_id, addressee_id, updated_at).await
    }

    async fn delete_pending_connection(
        &self,
        requester_id: Uuid,
        addressee_id: Uuid,
    ) -> Result<u64, StoreError> {
        self.inner.delete_pending_connection(requester_id, addressee_id).await
    }

    async fn delete_accepted_connection(&self, pair: CanonicalPair) -> Result<u64, StoreError> {
        self.inner.delete_accepted_connection(pair).await
    }

    async fn list_accepted_connections(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        self.inner.list_accepted_connections(user_id).await
    }

    async fn list_pending_incoming(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionWithUser>, StoreError> {
        self.inner.list_pending_incoming(user_id).await
    }
}
