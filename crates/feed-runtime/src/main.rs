//! # Social Feed Runtime
//!
//! Follows the posting contract: new blocks forward from the chain head and
//! history backward to the first relevant block, reconciling both into one
//! threaded feed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use feed_runtime::{FeedConfig, HttpFeedRuntime};
use feed_telemetry::TelemetryConfig;
use shared_bus::HistorySource;

/// Social feed scanner
#[derive(Parser, Debug)]
#[command(name = "feed-runtime")]
#[command(about = "Reconstructs the on-chain social feed from node and indexer data")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node JSON-RPC URL
    #[arg(long)]
    node_url: Option<String>,

    /// Node API key
    #[arg(long)]
    api_key: Option<String>,

    /// Indexer API URL
    #[arg(long)]
    indexer_url: Option<String>,

    /// Backward source: rpc or indexer
    #[arg(long)]
    history_source: Option<HistorySource>,

    /// Start height instead of the chain head
    #[arg(long)]
    initial_block: Option<u64>,

    /// Keep requesting history bursts until the first relevant block
    #[arg(long)]
    backfill: bool,

    /// Write the feed as JSON here on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Log level (overrides SF_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut FeedConfig) {
        if let Some(url) = &self.node_url {
            config.node.url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.node.api_key = key.clone();
        }
        if let Some(url) = &self.indexer_url {
            config.indexer.url = url.clone();
        }
        if let Some(source) = self.history_source {
            config.scan.history_source = source;
        }
        if let Some(height) = self.initial_block {
            config.scan.initial_block = Some(height);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    feed_telemetry::init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let mut config =
        FeedConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let mut runtime = HttpFeedRuntime::connect(&config, args.backfill)?;
    runtime.start().await?;

    info!("Feed runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown(args.snapshot.as_deref()).await
}
