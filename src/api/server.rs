//! Axum HTTP server
//!
//! Wires the gateway routes over shared state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::handlers::{
    get_block, get_chain, health, submit_fact, upload_multimedia, validate_chain, AppState,
};

/// Build the gateway router
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart uploads must be able to carry a full-size attachment
    let body_limit = state.config.max_file_bytes + 64 * 1024;

    Router::new()
        .route("/facts/submit", post(submit_fact))
        .route("/facts/:index", get(get_block))
        .route("/facts/:index/multimedia", post(upload_multimedia))
        .route("/chain", get(get_chain))
        .route("/validate", get(validate_chain))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Serve the gateway until the process exits
pub async fn serve(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");

    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
