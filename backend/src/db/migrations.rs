use anyhow::Result;
use sqlx::PgPool;

/// Applies `backend/migrations/` in order; already-applied versions are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;
    tracing::info!("Database schema is at migration {}", migrator.iter().count());
    Ok(())
}
