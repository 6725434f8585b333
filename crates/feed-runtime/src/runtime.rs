//! # Feed Runtime
//!
//! Wires the scan subsystems together and owns their lifetime.
//!
//! ## Startup Sequence
//!
//! 1. Build the node and indexer clients
//! 2. Create the post graph, the event bus and the scan controller
//! 3. Probe the node and fix the initial block
//! 4. Start the drivers and the event logger
//! 5. Request the first history burst

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use sf_02_scan_sources::{HttpIndexerApi, HttpNodeRpc};
use sf_03_post_graph::{PostGraphApi, PostGraphStore};
use sf_04_scan_controller::{ScanControlApi, ScanController, ScanStatus};
use shared_bus::{EventFilter, EventPublisher, FeedEvent, InMemoryEventBus};
use shared_types::{IndexerApi, NodeRpc};

use crate::config::FeedConfig;

/// The runtime over the production HTTP clients.
pub type HttpFeedRuntime = FeedRuntime<HttpNodeRpc, HttpIndexerApi>;

/// The feed runtime orchestrating the scan controller.
pub struct FeedRuntime<R: NodeRpc + 'static, I: IndexerApi + 'static> {
    controller: Arc<ScanController<R, I>>,
    graph: Arc<PostGraphStore>,
    bus: Arc<InMemoryEventBus>,
    keep_backfilling: bool,
    event_task: Option<JoinHandle<()>>,
}

impl HttpFeedRuntime {
    /// Build the runtime against the configured node and indexer.
    pub fn connect(config: &FeedConfig, keep_backfilling: bool) -> Result<Self> {
        let rpc = HttpNodeRpc::new(&config.node).context("Failed to create node client")?;
        let indexer =
            HttpIndexerApi::new(&config.indexer).context("Failed to create indexer client")?;
        Ok(Self::new(
            Arc::new(rpc),
            Arc::new(indexer),
            config,
            keep_backfilling,
        ))
    }
}

impl<R: NodeRpc + 'static, I: IndexerApi + 'static> FeedRuntime<R, I> {
    /// Build the runtime over arbitrary clients.
    ///
    /// With `keep_backfilling` every paused history burst is requested again
    /// one polling interval later, until history is exhausted.
    pub fn new(rpc: Arc<R>, indexer: Arc<I>, config: &FeedConfig, keep_backfilling: bool) -> Self {
        let graph = Arc::new(PostGraphStore::new(&config.chain));
        let bus = Arc::new(InMemoryEventBus::new());
        let controller = Arc::new(ScanController::new(
            rpc,
            indexer,
            graph.clone(),
            bus.clone(),
            config.chain.clone(),
            config.scan.clone(),
            config.indexer.page_limit,
        ));
        Self {
            controller,
            graph,
            bus,
            keep_backfilling,
            event_task: None,
        }
    }

    /// The scan controller.
    pub fn controller(&self) -> &Arc<ScanController<R, I>> {
        &self.controller
    }

    /// The reconciled feed.
    pub fn graph(&self) -> &Arc<PostGraphStore> {
        &self.graph
    }

    /// Current scan status.
    pub fn status(&self) -> ScanStatus {
        self.controller.status()
    }

    /// Probe the node, start both drivers and request the first history
    /// burst.
    pub async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Social Feed Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let initial_block = self
            .controller
            .initialize()
            .await
            .context("Node is not ready")?;

        self.event_task = Some(self.spawn_event_task());
        self.controller
            .start()
            .await
            .context("Failed to start scan drivers")?;

        let status = self.controller.status();
        info!(
            initial_block,
            history_source = status.history_source.as_str(),
            indexer_invalid = status.indexer_invalid,
            "Scan drivers running"
        );

        if !self.controller.scan_history().await {
            info!("History already exhausted");
        }
        Ok(())
    }

    fn spawn_event_task(&self) -> JoinHandle<()> {
        let mut events = self.bus.event_stream(EventFilter::all());
        let controller = self.controller.clone();
        let keep_backfilling = self.keep_backfilling;
        let retry_delay = controller.config().polling_interval();

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    FeedEvent::PostsMerged {
                        direction,
                        post_ids,
                        deorphaned,
                    } => info!(
                        %direction,
                        posts = post_ids.len(),
                        deorphaned = deorphaned.len(),
                        "Posts merged"
                    ),
                    FeedEvent::WatermarkAdvanced { .. } => {}
                    FeedEvent::HistoryPaused { reason } => {
                        info!(%reason, "History scan paused");
                        if keep_backfilling {
                            let controller = controller.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(retry_delay).await;
                                controller.scan_history().await;
                            });
                        }
                    }
                    FeedEvent::HistoryFinished => info!("History fully scanned"),
                    FeedEvent::NodeAvailability { available } => {
                        if available {
                            info!("Node available");
                        } else {
                            warn!("Node unavailable");
                        }
                    }
                    FeedEvent::IndexerInvalid { reason } => {
                        warn!(%reason, "Indexer unusable, switch to rpc history or fix the url")
                    }
                    FeedEvent::HistorySourceChanged(source) => {
                        info!(source = source.as_str(), "History source changed")
                    }
                }
            }
        })
    }

    /// Stop the drivers and optionally write the feed as JSON to
    /// `snapshot_path`.
    pub async fn shutdown(mut self, snapshot_path: Option<&Path>) -> Result<()> {
        info!("Initiating graceful shutdown...");
        self.controller.shutdown().await;
        if let Some(task) = self.event_task.take() {
            task.abort();
        }

        if let Some(path) = snapshot_path {
            let snapshot = self.graph.snapshot();
            let json = serde_json::to_string_pretty(&snapshot)
                .context("Failed to serialize feed snapshot")?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
            info!(
                path = %path.display(),
                posts = snapshot.posts.len(),
                "Feed snapshot written"
            );
        }

        info!(events = self.bus.events_published(), "Shutdown complete");
        Ok(())
    }
}
