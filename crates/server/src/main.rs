//! citecache server entry point.
//!
//! Boots the citation cache on either the HTTP read endpoint or the MCP
//! stdio transport. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use citecache_client::CitationClient;
use citecache_core::{AppConfig, CacheDb, CitationService, StalenessSweeper, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod handler;
mod handlers;
mod scheduler;
mod state;
mod tools;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening citation store at {}", config.db_path.display()))?;
    let fetcher = CitationClient::from_app_config(&config).context("building citation index client")?;

    let service = CitationService::new(db.clone(), Arc::new(fetcher), config.resolver_config());
    let sweeper = StalenessSweeper::new(db, config.freshness_policy().evict_after);
    let state = AppState::new(service, sweeper.clone());

    if config.sweep_enabled {
        scheduler::spawn_daily_sweep(sweeper, config.sweep_time()?);
    }

    match config.transport {
        Transport::Http => serve_http(state, &config.listen_addr).await,
        Transport::Stdio => serve_stdio(state).await,
    }
}

async fn serve_http(state: AppState, listen_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "Starting citecache server on HTTP transport");

    axum::serve(listener, app::create_app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

async fn serve_stdio(state: AppState) -> Result<()> {
    tracing::info!("Starting citecache server on stdio transport");

    let handler = handler::CiteCacheServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
