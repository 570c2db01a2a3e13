//! # ISS Bridge
//!
//! Decode Davis Vantage Vue ISS receiver frames into minute weather observations.
//!
//! This application polls the receiver's frame capture, assembles one
//! observation per minute and appends it to a rotating JSONL log.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use iss_bridge::config::{Config, LoggingConfig};
use iss_bridge::runner::Runner;
use iss_bridge::source::LogFileSource;
use iss_bridge::telemetry::JsonlObservationLogger;

/// Configuration used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of polls between decode statistics log messages
const STATS_INTERVAL_POLLS: u64 = 40;

/// Set up the tracing subscriber, to stdout or a daily-rolling file
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "iss-bridge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Main entry point for ISS Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the frame capture and the observation log
///
/// 2. **Warm-up**
///    - Replay recent frames before the stored cursor to prime the rolling
///      windows; observations from the replay are discarded
///
/// 3. **Main Loop**
///    - Poll for new frames every `poll_interval_ms`
///    - Append every finished observation to the JSONL log
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration is invalid, the observation log
/// directory cannot be created, or the warm-up cannot read the frame store.
/// Failed polls are logged and retried on the next tick.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(Path::new(&config_path))
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _guard = init_logging(&config.logging);

    info!("ISS Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    let source = LogFileSource::from_config(&config.source);
    info!(
        "Station height {} m, frames from {:?}",
        config.station.height_m,
        source.frame_log()
    );
    let mut runner = Runner::new(source, &config.station, config.source.clone());

    if config.telemetry.enabled {
        let logger = JsonlObservationLogger::new(&config.telemetry)
            .context("Failed to open observation log")?;
        info!("Observations logged to {}", config.telemetry.log_dir);
        runner = runner.with_sink(Box::new(logger));
    }

    runner.warm_up().await.context("Warm-up replay failed")?;

    let mut poll_interval = interval(Duration::from_millis(config.source.poll_interval_ms));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Polling every {} ms", config.source.poll_interval_ms);
    info!("Press Ctrl+C to exit");

    let mut polls: u64 = 0;
    let mut observations: u64 = 0;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                match runner.poll_once().await {
                    Ok(emitted) => observations += emitted.len() as u64,
                    Err(e) => error!("Poll failed: {}", e),
                }

                polls += 1;
                if polls % STATS_INTERVAL_POLLS == 0 {
                    info!("Decode statistics: {:?}", runner.assembler().stats());
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total observations emitted: {}", observations);
                break;
            }
        }
    }

    Ok(())
}
