//! Hypatia HTTP server
//!
//! Endpoints:
//! - POST /api/z-test              two-proportion Z-test
//! - POST /api/two-sample-z-test   two-independent-sample Z-test
//! - POST /api/one-sample-t-test   one-sample t-test
//! - POST /api/two-sample-t-test   two-sample t-test (Student + Welch)
//! - POST /api/paired-t-test       paired t-test
//!
//! Configuration comes from the environment:
//! - HYPATIA_ADDR  bind address (default 0.0.0.0:8080)
//! - RUST_LOG      tracing filter (default "info")

mod api;
mod input;

use std::env;

use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = "hypatia";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn bind_addr() -> String {
    env::var("HYPATIA_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = bind_addr();
    tracing::info!("{SERVER_NAME} v{SERVER_VERSION} starting");
    tracing::info!("binding {addr}");

    let app = api::router();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server ready, waiting for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
