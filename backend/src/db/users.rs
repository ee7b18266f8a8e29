use crate::models::{NewUser, User, UserPublic};
use super::StoreError;
use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;

type Result<T> = std::result::Result<T, StoreError>;

// User operations
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, display_name, email, hashed_password, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, username, display_name, email, hashed_password, created_at, updated_at
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(user.created_at)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, display_name, email, hashed_password, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, display_name, email, hashed_password, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, display_name, email, hashed_password, created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_display_name(
    pool: &PgPool,
    user_id: Uuid,
    display_name: &str,
    updated_at: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(display_name)
    .bind(updated_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Ranked substring search. The ORDER BY must stay in step with
/// `services::search::compare_matches`, since rows past LIMIT are never seen.
pub async fn search_users(pool: &PgPool, query: &str, limit: usize) -> Result<Vec<UserPublic>> {
    let users = sqlx::query_as::<_, UserPublic>(
        r#"
        SELECT id, username, display_name, created_at
        FROM users
        WHERE STRPOS(LOWER(username), LOWER($1)) > 0
           OR STRPOS(LOWER(display_name), LOWER($1)) > 0
        ORDER BY
            CASE
                WHEN LOWER(username) = LOWER($1) OR LOWER(display_name) = LOWER($1) THEN 1
                WHEN STARTS_WITH(LOWER(username), LOWER($1)) OR STARTS_WITH(LOWER(display_name), LOWER($1)) THEN 2
                ELSE 3
            END,
            CASE WHEN LOWER(username) = LOWER($1) THEN 0 ELSE 1 END,
            CASE WHEN LOWER(display_name) = LOWER($1) THEN 0 ELSE 1 END,
            LENGTH(username),
            LENGTH(display_name),
            username COLLATE "C"
        LIMIT $2
        "#,
    )
    .bind(query)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
