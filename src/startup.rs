//! Application startup and server initialization.
//!
//! This module wires the identity provider, session store, context store and
//! extractor into an `AppState` and serves the router.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::context::{ContextService, PlaceholderSummarizer};
use crate::extract::DocxExtractor;
use crate::providers::{create_identity_provider, IdentityProvider};
use crate::routes;
use crate::sessions::MemorySessionStore;
use crate::state::AppState;
use crate::store::create_store;

/// Builds the shared state from configuration.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    let provider: Arc<dyn IdentityProvider> = Arc::from(create_identity_provider(&config.provider));
    let contexts = ContextService::new(
        create_store(&config.store),
        Arc::new(DocxExtractor::with_limit(
            config.extraction.max_document_bytes,
        )),
        Arc::new(PlaceholderSummarizer),
        Duration::from_millis(config.extraction.timeout_in_ms),
    );

    AppState {
        config,
        provider,
        sessions: Arc::new(MemorySessionStore::new()),
        contexts: Arc::new(contexts),
    }
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the configured address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.bind_address();
    let app = routes::create_router(build_state(config));

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|e| format!("Could not bind to {}: {}", bind_address, e))?;
    info!("Server running on {}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
