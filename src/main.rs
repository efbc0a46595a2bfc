// SPDX-License-Identifier: MIT

//! Housekeeping API Server
//!
//! Task board and staff directory backend for the housekeeping SPA.

use housekeeping_api::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreStore, MemoryStore},
    services::FirebaseTokenVerifier,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        environment = config.environment.as_str(),
        "Starting Housekeeping API"
    );

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let verifier = Arc::new(FirebaseTokenVerifier::new(&config)?);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, verifier));

    // Build router
    let app = housekeeping_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, api_prefix = %config.api_prefix, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("housekeeping_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
