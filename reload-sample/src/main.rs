//! # reload-sample
//!
//! Sample HTTP service used to check that a development container picks up
//! code and configuration changes while running.
//!
//! ## Architecture
//!
//! - **Signals**: `/`, `/health`, `/info`, `/version`, `/echo` expose values that change on reload
//! - **Credential**: bcrypt digests with embedded salt for `/hash`
//! - **Token**: HS256 claim sets signed with a pluggable key provider for `/token`
//! - **Convert**: order-preserving JSON to YAML re-encoding for `/yaml`
//! - **HTTP**: Axum router with request IDs, tracing, and graceful shutdown
//!
//! Every handler is stateless; nothing outlives a request.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod config;
mod convert;
mod credential;
mod http;
mod token;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        service = %config.service_name,
        hash_cost = config.hash_cost,
        reload_marker = %config.reload_marker,
        signing_key_configured = config.token_signing_key.is_some(),
        "configuration loaded"
    );

    let state = AppState::from_config(&config);
    if state.tokens.uses_demo_key() {
        warn!("no TOKEN_SIGNING_KEY configured; signing tokens with the public demo key");
    }

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "reload-sample listening");

    serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
