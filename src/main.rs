//! Locust Exporter - Entry Point
//!
//! Serves Prometheus metrics built from the CSV reports Locust writes
//! with `--csv`. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Parse flags, merge with the optional config file, validate
//! 2. Init tracing (JSON or text structured logging)
//! 3. Create the metric store and the file-backed report source
//! 4. Spawn the HTTP server (landing page, telemetry, /live)
//! 5. Wait for SIGINT → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use locust_exporter::adapters::metrics::{FatalAction, MetricStore, MetricsServer};
use locust_exporter::adapters::source::CsvFileSource;
use locust_exporter::config::{self, AppConfig, Cli, LogFormat};
use locust_exporter::usecases::Exporter;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from flags (+ optional file) ──
    let config = config::loader::resolve(Cli::parse()).context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        revision = option_env!("GIT_REVISION").unwrap_or("unknown"),
        "Starting locust_exporter"
    );
    info!(
        stats = %config.csv.stats.display(),
        failures = %config.csv.failures.display(),
        "Reading Locust reports"
    );

    // ── 3. Metric store + report source ─────────────────────
    let store = MetricStore::new().context("Failed to register metrics")?;
    let source = Arc::new(CsvFileSource::new(&config.csv.stats, &config.csv.failures));
    let exporter = Arc::new(Exporter::new(source, store));

    // ── 4. Spawn HTTP server ────────────────────────────────
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let server = MetricsServer::new(exporter, &config.web.telemetry_path, FatalAction::Exit);
    let mut server_handle = tokio::spawn(server.run(config.web.bind_address(), shutdown_rx));

    // ── 5. Wait for SIGINT or an early server exit ──────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, shutting down");
        }
        result = &mut server_handle => {
            return result.context("Server task panicked")?;
        }
    }

    let _ = shutdown_tx.send(());
    server_handle.await.context("Server task panicked")??;

    info!("Shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `--log.level`.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    match config.log.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
