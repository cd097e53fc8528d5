//! Bunkplan HTTP service.
//!
//! Run with: cargo run -p bunkplan-service
//! Settings load from ./solver.toml when present, built-in defaults
//! otherwise. Override the log filter with RUST_LOG.

use std::net::SocketAddr;
use std::sync::Arc;

use bunkplan_config::SolverSettings;
use bunkplan_service::{api, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = SolverSettings::load("solver.toml").unwrap_or_default();
    if let Err(err) = settings.validate() {
        eprintln!("invalid solver.toml: {err}");
        std::process::exit(1);
    }

    let state = Arc::new(AppState::new(settings));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!(event = "listening", addr = %addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
