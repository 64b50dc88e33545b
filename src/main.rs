//! Scorefeed - public scoreboard snapshot converter
//!
//! Fetches contest state from a judging backend at a fixed interval and
//! publishes the public scoreboard snapshot documents.

use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scorefeed::api;
use scorefeed::config::Config;
use scorefeed::pipeline::PipelineRunner;
use scorefeed::writer::SnapshotWriter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorefeed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting scorefeed converter");

    let config = Config::from_env()?;
    tracing::info!(
        "Target contest {} at {}",
        config.filter.contest_id,
        config.api.base_url
    );

    let source = api::build_source(&config)?;
    let writer = SnapshotWriter::new(&config.output.dest);
    let interval_ms = config.schedule.interval_ms;
    let runner = PipelineRunner::new(source, writer, config);

    match interval_ms {
        // Single-run mode: surface the cycle result to the caller.
        None => runner.run_cycle().await?,
        Some(ms) => {
            let interval = Duration::from_millis(ms);
            tracing::info!("Polling every {} ms", ms);

            // The next cycle is scheduled only after the previous one has
            // settled, so cycles never overlap.
            loop {
                if let Err(e) = runner.run_cycle().await {
                    tracing::error!("Snapshot cycle failed: {}", e);
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("Scorefeed shutdown complete");
    Ok(())
}
