//! Minimal HTTP health endpoint for polling mode.
//!
//! Some hosts only keep a service alive while it answers on a port; the
//! bot itself never receives traffic here.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tracing::info;

fn router() -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/health", get(|| async { "ok" }))
}

/// Serve the health endpoint on `port` until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Health endpoint listening on {}", address);

    axum::serve(listener, router()).await?;
    Ok(())
}
