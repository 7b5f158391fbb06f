mod cache;
mod config;
mod error;
mod fetch;
mod handlers;
mod logging;
mod routes;
mod scheduler;
mod state;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

use crate::cache::{ArtifactCache, SourceCache, SystemClock};
use crate::config::AppConfig;
use crate::fetch::HttpFetcher;
use crate::scheduler::RefreshScheduler;
use crate::state::AppState;

/// Republish private ICS feeds as redacted busy/free calendars.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file
    config: PathBuf,

    /// Address to listen on, overriding `listen_addr` from the config file
    #[arg(long, env = "ICSFILTER_LISTEN")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Load configuration
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing
    let _log_guard = logging::init(&config.logging)?;

    tracing::info!(
        "Starting ICS filter with {} calendars",
        config.calendars.len()
    );

    // Build caches
    let fetcher = Arc::new(
        HttpFetcher::new(config.fetch_timeout()).context("Failed to build HTTP client")?,
    );
    let clock = Arc::new(SystemClock);
    let sources = Arc::new(SourceCache::new(fetcher, clock.clone(), config.source_ttl()));
    let calendars = Arc::new(ArtifactCache::new(sources, clock));

    for calendar in &config.calendars {
        calendars.register(calendar.clone()).await;
    }
    tracing::info!(
        "Registered {} distinct source feeds",
        calendars.sources().len().await
    );

    // Start the refresh driver
    let scheduler = RefreshScheduler::new(calendars.clone(), config.refresh_interval());
    let scheduler_handle = tokio::spawn(scheduler.run());

    // Run server
    let app = routes::app(AppState::new(calendars));
    let addr = args.listen.unwrap_or(config.listen_addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_handle.abort();
    tracing::info!("ICS filter stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping...");
}
