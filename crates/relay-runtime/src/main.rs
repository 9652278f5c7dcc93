//! # Channel Relay
//!
//! Copies posts from one origin channel into the channels their keywords
//! route to, and keeps those copies in step with later edits, replies and
//! deletions.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `RELAY_*` environment variables
//! 2. Open the mapping document under the data directory (process lock)
//! 3. Create missing routing, keyword and admin documents
//! 4. Spawn the retention sweeper
//! 5. Dispatch events read from stdin until EOF or Ctrl+C
//!
//! Log verbosity follows `RELAY_LOG` (an `EnvFilter` directive, default `info`).

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use relay_runtime::adapters::DryRunTransport;
use relay_runtime::{EventFeedHandler, RelayConfig, RelayRuntime};

const LOG_FILTER_VAR: &str = "RELAY_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RelayConfig::from_env().context("Failed to load relay configuration")?;

    info!("===========================================");
    info!("  Channel Relay v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let transport = Arc::new(DryRunTransport::new());
    let runtime = Arc::new(
        RelayRuntime::new(config, transport).context("Failed to create relay runtime")?,
    );
    runtime.start();

    info!("Relay is running. Reading events from stdin, press Ctrl+C to stop.");
    let feed = EventFeedHandler::new(Arc::clone(&runtime));

    tokio::select! {
        stats = feed.run(BufReader::new(tokio::io::stdin())) => {
            info!(?stats, "Event feed closed");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
            info!("Interrupt received");
        }
    }

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
