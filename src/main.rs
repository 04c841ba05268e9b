// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use autoposter_agent::app::{create_router, AppState, ServerConfig, VERSION};
use autoposter_agent::services::engine::{CrawlEngine, EngineConfig};
use autoposter_agent::services::logging::init_tracing;
use autoposter_agent::services::token::{AuthConfig, TokenVerifier};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

/// AutoPoster backend: page scraping and helper endpoints.
#[derive(Debug, Parser)]
#[command(version = VERSION)]
struct Args {
    /// Address to bind (0.0.0.0 accepts connections from any interface, required for Docker)
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let engine_config = EngineConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    info!(
        fetch_timeout_secs = engine_config.fetch_timeout.as_secs(),
        page_concurrency = engine_config.page_concurrency,
        job_timeout_secs = engine_config.job_timeout.map(|t| t.as_secs()),
        "crawl engine configured"
    );

    let engine = CrawlEngine::new(engine_config).context("Failed to create crawl engine")?;

    let state = AppState {
        engine: Arc::new(engine),
        token_verifier: Arc::new(TokenVerifier::new(&auth_config)),
    };

    let app = create_router(state, &server_config);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("autoposter-agent v{} listening on {}", VERSION, addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
