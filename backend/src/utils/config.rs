use anyhow::{Context, Result};
use chrono::Duration;
use std::env;
use std::str::FromStr;
use crate::constants::{DEFAULT_SERVER_PORT, DEFAULT_TOKEN_TTL_HOURS};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Comma-separated CORS origins; any origin is allowed when unset.
    pub allowed_origins: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let token_ttl_hours = parse_setting(
            "TOKEN_TTL_HOURS",
            env::var("TOKEN_TTL_HOURS").ok(),
            DEFAULT_TOKEN_TTL_HOURS,
        )?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: parse_setting("PORT", env::var("PORT").ok(), DEFAULT_SERVER_PORT)?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            token_ttl: token_ttl_from_hours(token_ttl_hours)?,
            bcrypt_cost: parse_setting("BCRYPT_COST", env::var("BCRYPT_COST").ok(), bcrypt::DEFAULT_COST)?,
            allowed_origins: env::var("ALLOWED_ORIGINS").ok(),
        })
    }
}

/// `default` when the variable is unset; an error when it is set but unparsable.
fn parse_setting<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
    }
}

fn token_ttl_from_hours(hours: i64) -> Result<Duration> {
    Duration::try_hours(hours)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| anyhow::anyhow!("TOKEN_TTL_HOURS must be a positive number of hours, got {}", hours))
}
