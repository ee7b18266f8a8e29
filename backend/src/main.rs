use clap::Parser;
use connectsphere::{
    create_router, db::{DatabaseConfig, PgStore}, get_db_pool, services::AuthGate, utils, AppState,
    Config,
};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "server", about = "ConnectSphere API server")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not apply pending migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();
    let args = Args::parse();

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    if args.skip_migrations {
        tracing::info!("Skipping migrations");
    } else {
        connectsphere::db::migrations::run_migrations(&pool).await?;
    }

    let state = AppState::new(Arc::new(PgStore::new(pool)), AuthGate::from_config(&config));
    let app = create_router(state, &config);

    let port = args.port.unwrap_or(config.port);
    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
