//! Valuta API Server
//!
//! Main entry point for the Valuta pricing backend.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valuta_api::{AppState, create_router};
use valuta_core::ingest::RateProvider;
use valuta_db::connect;
use valuta_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valuta=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create the rate provider client
    let provider = RateProvider::from_config(config.provider.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build rate provider client: {e}"))?;
    info!(
        url = %config.provider.url,
        home = %config.provider.home_code,
        "Rate provider configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        provider: Arc::new(provider),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
