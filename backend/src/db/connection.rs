use anyhow::Result;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use dotenvy::dotenv;

use crate::constants::{DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_STORAGE_TIMEOUT_SECS};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Bounds both waiting for a pooled connection and each statement.
    pub storage_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            storage_timeout: Duration::from_secs(
                env::var("STORAGE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_STORAGE_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_STORAGE_TIMEOUT_SECS),
            ),
        })
    }
}

pub async fn get_db_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let statement_timeout = format!("{}", config.storage_timeout.as_millis());
    let connect_options = PgConnectOptions::from_str(&config.database_url)?
        .options([("statement_timeout", statement_timeout.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.storage_timeout)
        .connect_with(connect_options)
        .await?;

    tracing::info!(
        "Connected to database (max_connections={}, storage_timeout={:?})",
        config.max_connections,
        config.storage_timeout
    );

    Ok(pool)
}
