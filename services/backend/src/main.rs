use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

mod controllers;
mod db;
mod errors;
mod models;
mod routers;
mod settings;

use controllers::SongController;
use db::{PgSongStore, seed};
use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("❌ {}", e);
            return Err(e.into());
        }
    };

    let store = match PgSongStore::connect(&settings.db).await {
        Ok(store) => {
            info!("📊 Connected to document store at {}", settings.db.redacted_url());
            store
        }
        Err(e) => {
            error!("❌ Failed to connect to document store: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = store.migrate().await {
        error!("❌ Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    info!("📊 Database migrations completed");

    // One-time bulk load; a failure here must not leave us serving half-seeded data.
    if let Err(e) = seed::load_seed_file(&store, &settings.seed_file).await {
        error!("❌ Error loading seed data: {:#}", e);
        return Err(e);
    }

    let songs = SongController::new(Arc::new(store));
    let app = routers::app(songs);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    info!("🎧 Song service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
