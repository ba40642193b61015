use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use it_drinks_api::config::{self, StorageBackend};
use it_drinks_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use it_drinks_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting It Drinks API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            bail!("JWT_SECRET must be set in production");
        }
        bail!("JWT_SECRET is empty; set it in the environment or .env");
    }

    let store: Arc<dyn Store> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.clone());

    if config.server.seed_on_start {
        state.seeder().run().await.context("failed to seed demo data")?;
    }

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("It Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
