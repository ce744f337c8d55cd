/// Axum HTTP server setup and routing

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::AppState;
use crate::handlers::*;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow requests from wallet frontend/tests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Transaction endpoints
        .route("/tx", post(broadcast_transaction))
        .route("/tx/:txid/hex", get(get_transaction_hex))

        // Address endpoints
        .route("/address/:address", get(get_address))
        .route("/address/:address/utxo", get(get_address_utxos))

        // Shared state
        .with_state(state)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(state: AppState, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Esplora mock server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve `state` on an ephemeral localhost port in the background
///
/// Returns the bound address; the server runs until the handle is aborted
/// or the runtime shuts down.
pub async fn spawn_server(state: AppState) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Esplora mock server stopped: {}", e);
        }
    });

    log::debug!("Esplora mock serving on http://{}", addr);
    Ok((addr, handle))
}
