use crate::models::{CanonicalPair, Connection, ConnectionStatus, ConnectionWithUser, UserPublic};
use super::StoreError;
use sqlx::{FromRow, PgPool};
use chrono::{DateTime, Utc};
use uuid::Uuid;

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, FromRow)]
struct ConnectionRow {
    id: Uuid,
    requester_id: Uuid,
    addressee_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConnectionRow> for Connection {
    type Error = StoreError;

    fn try_from(row: ConnectionRow) -> Result<Self> {
        Ok(Connection {
            id: row.id,
            requester_id: row.requester_id,
            addressee_id: row.addressee_id,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// An edge joined with the counterpart's public columns.
#[derive(Debug, FromRow)]
struct ConnectionWithUserRow {
    #[sqlx(flatten)]
    connection: ConnectionRow,
    user_id: Uuid,
    user_username: String,
    user_display_name: String,
    user_created_at: DateTime<Utc>,
}

impl TryFrom<ConnectionWithUserRow> for ConnectionWithUser {
    type Error = StoreError;

    fn try_from(row: ConnectionWithUserRow) -> Result<Self> {
        Ok(ConnectionWithUser {
            connection: row.connection.try_into()?,
            user: UserPublic {
                id: row.user_id,
                username: row.user_username,
                display_name: row.user_display_name,
                created_at: row.user_created_at,
            },
        })
    }
}

// Connection operations
pub async fn create_connection(pool: &PgPool, connection: &Connection) -> Result<()> {
    let pair = connection.pair();

    sqlx::query(
        r#"
        INSERT INTO user_connections
            (id, requester_id, addressee_id, user_low, user_high, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(connection.id)
    .bind(connection.requester_id)
    .bind(connection.addressee_id)
    .bind(pair.low())
    .bind(pair.high())
    .bind(connection.status.as_str())
    .bind(connection.created_at)
    .bind(connection.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_connection(pool: &PgPool, pair: CanonicalPair) -> Result<Option<Connection>> {
    let row = sqlx::query_as::<_, ConnectionRow>(
        r#"
        SELECT id, requester_id, addressee_id, status, created_at, updated_at
        FROM user_connections
        WHERE user_low = $1 AND user_high = $2
        "#,
    )
    .bind(pair.low())
    .bind(pair.high())
    .fetch_optional(pool)
    .await?;

    row.map(Connection::try_from).transpose()
}

pub async fn accept_connection(
    pool: &PgPool,
    requester_id: Uuid,
    addressee_id: Uuid,
    updated_at: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE user_connections
        SET status = $1, updated_at = $2
        WHERE requester_id = $3 AND addressee_id = $4 AND status = $5
        "#,
    )
    .bind(ConnectionStatus::Accepted.as_str())
    .bind(updated_at)
    .bind(requester_id)
    .bind(addressee_id)
    .bind(ConnectionStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_pending_connection(pool: &PgPool, requester_id: Uuid, addressee_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_connections
        WHERE requester_id = $1 AND addressee_id = $2 AND status = $3
        "#,
    )
    .bind(requester_id)
    .bind(addressee_id)
    .bind(ConnectionStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_accepted_connection(pool: &PgPool, pair: CanonicalPair) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_connections
        WHERE user_low = $1 AND user_high = $2 AND status = $3
        "#,
    )
    .bind(pair.low())
    .bind(pair.high())
    .bind(ConnectionStatus::Accepted.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_accepted_connections(pool: &PgPool, user_id: Uuid) -> Result<Vec<ConnectionWithUser>> {
    let rows = sqlx::query_as::<_, ConnectionWithUserRow>(
        r#"
        SELECT
            uc.id, uc.requester_id, uc.addressee_id, uc.status, uc.created_at, uc.updated_at,
            u.id as user_id, u.username as user_username,
            u.display_name as user_display_name, u.created_at as user_created_at
        FROM user_connections uc
        JOIN users u ON u.id = CASE
            WHEN uc.requester_id = $1 THEN uc.addressee_id
            ELSE uc.requester_id
        END
        WHERE (uc.requester_id = $1 OR uc.addressee_id = $1) AND uc.status = $2
        ORDER BY u.display_name, u.id
        "#,
    )
    .bind(user_id)
    .bind(ConnectionStatus::Accepted.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ConnectionWithUser::try_from).collect()
}

pub async fn get_pending_incoming(pool: &PgPool, user_id: Uuid) -> Result<Vec<ConnectionWithUser>> {
    let rows = sqlx::query_as::<_, ConnectionWithUserRow>(
        r#"
        SELECT
            uc.id, uc.requester_id, uc.addressee_id, uc.status, uc.created_at, uc.updated_at,
            u.id as user_id, u.username as user_username,
            u.display_name as user_display_name, u.created_at as user_created_at
        FROM user_connections uc
        JOIN users u ON u.id = uc.requester_id
        WHERE uc.addressee_id = $1 AND uc.status = $2
        ORDER BY uc.created_at DESC, uc.id
        "#,
    )
    .bind(user_id)
    .bind(ConnectionStatus::Pending.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ConnectionWithUser::try_from).collect()
}
