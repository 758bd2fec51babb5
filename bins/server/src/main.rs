//! Kafala ledger API server
//!
//! Main entry point for the donation and handover ledger service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kafala_api::{AppState, create_router};
use kafala_core::storage::{ReportImageStore, StorageConfig};
use kafala_db::{LedgerService, SeaLedgerRepository, connect};
use kafala_shared::{AppConfig, JwtVerifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kafala=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let ledger = LedgerService::new(Arc::new(SeaLedgerRepository::new(db)));

    // Report image storage is optional
    let storage = match config.storage.as_ref() {
        Some(settings) => {
            let store = ReportImageStore::from_config(StorageConfig::from(settings))?;
            info!(provider = store.provider_name(), "Report image storage configured");
            Some(Arc::new(store))
        }
        None => {
            warn!("No storage configured, report image uploads are disabled");
            None
        }
    };

    let state = AppState {
        ledger,
        jwt: Arc::new(JwtVerifier::new(&config.jwt)),
        storage,
        ledger_config: Arc::new(config.ledger.clone()),
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
