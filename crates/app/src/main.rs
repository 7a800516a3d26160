use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use server::ServerOptions;
use settings::Database;
use tracing_subscriber::EnvFilter;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ledger={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let engine = build_engine(&server.database).await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let options = ServerOptions {
        request_timeout: Duration::from_secs(server.request_timeout_secs),
    };

    server::run_with_listener(engine, options, listener).await?;
    Ok(())
}

async fn build_engine(
    config: &Database,
) -> Result<engine::Engine, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => {
            tracing::warn!("using an in-memory store, balances are lost on exit");
            return Ok(engine::Engine::builder().in_memory().build().await?);
        }
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
        Database::Postgres(url) => url.clone(),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(engine::Engine::builder().database(database).build().await?)
}
