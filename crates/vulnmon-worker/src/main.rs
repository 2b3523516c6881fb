//! VulnMon Worker - CVE feed ingestion daemon

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use vulnmon_common::logging::{init_logging, LogConfig, LogLevel};
use vulnmon_worker::{config::WorkerConfig, FeedClient, Ingestor, PgStore};

#[derive(Parser, Debug)]
#[command(name = "vulnmon-worker")]
#[command(author, version, about = "Vulnerability feed ingestion worker")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Ingest a single batch and exit instead of polling forever
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .file_prefix("vulnmon-worker")
        .filter_directives("sqlx=warn,hyper=info,reqwest=info")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting VulnMon worker");

    let config = WorkerConfig::load().context("Invalid worker configuration")?;
    info!(
        feed_url = %config.feed.url,
        source = %config.feed.source,
        poll_interval_secs = config.schedule.poll_interval_secs,
        "Configuration loaded"
    );

    let store = PgStore::connect_lazy(&config.database)?;
    let feed = FeedClient::new(config.feed.clone())?;
    let mut ingestor = Ingestor::new(feed, store, config.feed.source.as_str(), &config.schedule);

    tokio::select! {
        _ = ingestor.wait_for_store() => {},
        _ = shutdown_signal() => {
            info!("Shut down before the store became reachable");
            return Ok(());
        },
    }

    if config.run_migrations {
        ingestor
            .store()
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
    }

    if cli.once {
        let stats = ingestor.run_once().await;
        if stats.fetch_failed {
            warn!("Feed fetch failed, nothing was ingested");
        }
        info!(stored = stats.stored(), failed = stats.failed(), "Single batch complete");
        return Ok(());
    }

    tokio::select! {
        _ = ingestor.run_forever() => {},
        _ = shutdown_signal() => {},
    }

    info!("Worker shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
