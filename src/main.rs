//! Server binary: environment loading, logging, and the axum listener.

use anyhow::{Context, Result};
use pdf_ocr_gateway::{router, AppState, GatewayConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pdf_ocr_gateway=info,tower_http=info")),
        )
        .init();

    // Fail fast on missing API keys rather than on the first request.
    let config = GatewayConfig::from_env().context("configuration")?;
    let addr = format!("{}:{}", config.host, config.port);

    let http = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let state = AppState::new(config, http);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("server")?;

    Ok(())
}
