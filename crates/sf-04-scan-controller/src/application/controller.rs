//! # Scan Controller
//!
//! Owns the two drivers as tokio tasks:
//!
//! - the forward driver ticks every polling interval for as long as the
//!   controller runs; while the node is unreachable each tick is a probe
//! - the backward driver sleeps until `scan_history` is called, then runs a
//!   burst bounded by the scan budget; transport faults and an exhausted
//!   budget pause it until the next call, reaching the first relevant block
//!   ends it for good
//!
//! Shutdown is cooperative: each driver checks the shutdown flag before
//! every step, so in-flight steps finish and commit before the task exits.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use sf_01_event_decoder::EventDecoder;
use sf_02_scan_sources::{BlockWalkSource, IndexerSource};
use sf_03_post_graph::PostGraphStore;
use shared_bus::{EventPublisher, FeedEvent, HistorySource, InMemoryEventBus};
use shared_types::{ChainParams, IndexerApi, NodeRpc, ScanDirection};

use super::backward::BackwardDriver;
use super::forward::ForwardDriver;
use super::pipeline::BatchPipeline;
use crate::config::ScanConfig;
use crate::domain::{BatchReport, ControllerError, ScanStatus, StepError, StepOutcome};
use crate::ports::ScanControlApi;

/// State shared between the controller and its driver tasks.
#[derive(Clone)]
struct DriverContext {
    status: Arc<RwLock<ScanStatus>>,
    bus: Arc<InMemoryEventBus>,
    config: ScanConfig,
    shutdown: watch::Receiver<bool>,
    trigger: Arc<Notify>,
}

impl DriverContext {
    fn stopping(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn node_available(&self, available: bool) {
        let changed = {
            let mut status = self.status.write();
            let changed = status.node_available != available;
            status.node_available = available;
            changed
        };
        if changed {
            if available {
                info!("[sf-04] Node reachable again");
            } else {
                warn!("[sf-04] Node unreachable");
            }
            self.bus
                .publish(FeedEvent::NodeAvailability { available })
                .await;
        }
    }

    async fn progress(&self, direction: ScanDirection, height: Option<u64>, report: &BatchReport) {
        if let Some(height) = height {
            {
                let mut status = self.status.write();
                match direction {
                    ScanDirection::Forward => status.forward_watermark = Some(height),
                    ScanDirection::Backward => status.backward_watermark = Some(height),
                }
            }
            self.bus
                .publish(FeedEvent::WatermarkAdvanced { direction, height })
                .await;
        }
        if !report.inserted.is_empty() || !report.deorphaned.is_empty() {
            self.bus
                .publish(FeedEvent::PostsMerged {
                    direction,
                    post_ids: report.inserted.clone(),
                    deorphaned: report.deorphaned.clone(),
                })
                .await;
        }
    }

    async fn pause_history(&self, reason: impl Into<String>) {
        let reason = reason.into();
        info!(%reason, "[sf-04] Backward: paused");
        self.bus.publish(FeedEvent::HistoryPaused { reason }).await;
    }

    async fn finish_history(&self) {
        {
            let mut status = self.status.write();
            status.no_more_past_blocks = true;
            status.scanning_past_blocks = false;
        }
        info!("[sf-04] Backward: no more history");
        self.bus.publish(FeedEvent::HistoryFinished).await;
    }

    async fn sleep_or_stop(&mut self, duration: std::time::Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.shutdown.changed() => {}
        }
    }
}

async fn run_forward<R: NodeRpc + 'static>(mut driver: ForwardDriver<R>, mut ctx: DriverContext) {
    info!("[sf-04] Forward driver started");
    while !ctx.stopping() {
        match driver.step().await {
            Ok(StepOutcome::Advanced { height, report }) => {
                ctx.node_available(true).await;
                ctx.progress(ScanDirection::Forward, Some(height), &report)
                    .await;
            }
            Ok(_) => ctx.node_available(true).await,
            Err(err) => {
                warn!(error = %err, "[sf-04] Forward: step failed");
                ctx.node_available(false).await;
            }
        }
        let interval = ctx.config.polling_interval();
        ctx.sleep_or_stop(interval).await;
    }
    info!("[sf-04] Forward driver stopped");
}

async fn run_backward<R, I>(mut driver: BackwardDriver<R, I>, mut ctx: DriverContext)
where
    R: NodeRpc + 'static,
    I: IndexerApi + 'static,
{
    info!("[sf-04] Backward driver started");
    'bursts: loop {
        let trigger = ctx.trigger.clone();
        tokio::select! {
            _ = trigger.notified() => {}
            _ = ctx.shutdown.changed() => {}
        }
        if ctx.stopping() {
            break;
        }

        ctx.status.write().scanning_past_blocks = true;
        let deadline = Instant::now() + ctx.config.scan_budget();
        info!("[sf-04] Backward: burst started");

        loop {
            if ctx.stopping() {
                break 'bursts;
            }
            if Instant::now() >= deadline {
                ctx.pause_history("scan budget exhausted").await;
                break;
            }

            let source = ctx.status.read().history_source;
            driver.set_history_source(source);

            match driver.step().await {
                Ok(StepOutcome::Finished) => {
                    ctx.node_available(true).await;
                    ctx.finish_history().await;
                    break 'bursts;
                }
                Ok(StepOutcome::Advanced { height, report }) => {
                    ctx.node_available(true).await;
                    ctx.progress(ScanDirection::Backward, Some(height), &report)
                        .await;
                    if driver.reached_floor() {
                        ctx.finish_history().await;
                        break 'bursts;
                    }
                }
                Ok(StepOutcome::Paged { report }) => {
                    ctx.node_available(true).await;
                    ctx.progress(ScanDirection::Backward, None, &report).await;
                }
                Ok(StepOutcome::Idle) => ctx.node_available(true).await,
                Err(StepError::Node(err)) => {
                    ctx.node_available(false).await;
                    ctx.pause_history(format!("node unavailable: {err}")).await;
                    break;
                }
                Err(StepError::Indexer(err)) => {
                    error!(error = %err, "[sf-04] Backward: indexer failed");
                    ctx.status.write().indexer_invalid = true;
                    ctx.bus
                        .publish(FeedEvent::IndexerInvalid {
                            reason: err.to_string(),
                        })
                        .await;
                    ctx.pause_history("indexer unavailable").await;
                    break;
                }
            }

            let interval = ctx.config.scanning_interval();
            ctx.sleep_or_stop(interval).await;
        }

        ctx.status.write().scanning_past_blocks = false;
    }
    ctx.status.write().scanning_past_blocks = false;
    info!("[sf-04] Backward driver stopped");
}

/// Scan controller.
pub struct ScanController<R: NodeRpc + 'static, I: IndexerApi + 'static> {
    rpc: Arc<R>,
    indexer: Arc<I>,
    params: ChainParams,
    config: ScanConfig,
    page_limit: usize,
    pipeline: BatchPipeline,
    bus: Arc<InMemoryEventBus>,
    status: Arc<RwLock<ScanStatus>>,
    trigger: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<R: NodeRpc + 'static, I: IndexerApi + 'static> ScanController<R, I> {
    /// Create a controller over `graph`. Nothing runs until `start`.
    pub fn new(
        rpc: Arc<R>,
        indexer: Arc<I>,
        graph: Arc<PostGraphStore>,
        bus: Arc<InMemoryEventBus>,
        params: ChainParams,
        config: ScanConfig,
        page_limit: usize,
    ) -> Self {
        let decoder = Arc::new(EventDecoder::new(rpc.clone(), params.clone()));
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            status: Arc::new(RwLock::new(ScanStatus::new(config.history_source))),
            pipeline: BatchPipeline::new(decoder, graph),
            rpc,
            indexer,
            params,
            config,
            page_limit,
            bus,
            trigger: Arc::new(Notify::new()),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// The graph both drivers merge into.
    pub fn graph(&self) -> &Arc<PostGraphStore> {
        self.pipeline.graph()
    }

    /// The event bus status changes are published on.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Driver timing configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn context(&self) -> DriverContext {
        DriverContext {
            status: self.status.clone(),
            bus: self.bus.clone(),
            config: self.config.clone(),
            shutdown: self.shutdown_tx.subscribe(),
            trigger: self.trigger.clone(),
        }
    }

    fn indexer_source(&self) -> IndexerSource<I, R> {
        IndexerSource::new(
            self.indexer.clone(),
            self.rpc.clone(),
            self.params.clone(),
            self.page_limit,
        )
    }

    async fn set_node_available(&self, available: bool) {
        let previous = std::mem::replace(&mut self.status.write().node_available, available);
        if previous != available {
            self.bus
                .publish(FeedEvent::NodeAvailability { available })
                .await;
        }
    }

    async fn check_indexer(&self) {
        let reason = match self.indexer_source().validate().await {
            Ok(true) => return,
            Ok(false) => "indexer does not serve the posting contract".to_string(),
            Err(err) => err.to_string(),
        };
        warn!(%reason, "[sf-04] Indexer rejected");
        self.status.write().indexer_invalid = true;
        self.bus.publish(FeedEvent::IndexerInvalid { reason }).await;
    }
}

#[async_trait]
impl<R: NodeRpc + 'static, I: IndexerApi + 'static> ScanControlApi for ScanController<R, I> {
    async fn initialize(&self) -> Result<u64, ControllerError> {
        let sync = match self.rpc.sync_status().await {
            Ok(sync) => sync,
            Err(err) => {
                self.set_node_available(false).await;
                return Err(ControllerError::NodeNotReady(err.to_string()));
            }
        };
        if sync.is_some_and(|s| s.syncing) {
            return Err(ControllerError::NodeNotReady("node is syncing".to_string()));
        }

        let head = self
            .rpc
            .last_block()
            .await
            .map_err(|e| ControllerError::NodeNotReady(e.to_string()))?
            .ok_or_else(|| ControllerError::NodeNotReady("node has no head block".to_string()))?;
        self.set_node_available(true).await;

        let initial_block = self.config.initial_block.unwrap_or(head.height);
        self.status.write().initial_block = Some(initial_block);

        let history_source = self.status.read().history_source;
        if history_source == HistorySource::Indexer {
            self.check_indexer().await;
        }

        info!(
            head = head.height,
            initial_block, "[sf-04] Scan controller initialized"
        );
        Ok(initial_block)
    }

    async fn start(&self) -> Result<(), ControllerError> {
        let initial_block = self
            .status
            .read()
            .initial_block
            .ok_or(ControllerError::NotInitialized)?;

        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return Err(ControllerError::AlreadyRunning);
        }

        let forward = ForwardDriver::new(
            BlockWalkSource::new(self.rpc.clone(), self.params.clone()),
            self.pipeline.clone(),
            &self.params,
            initial_block,
        );
        let backward = BackwardDriver::new(
            BlockWalkSource::new(self.rpc.clone(), self.params.clone()),
            self.indexer_source(),
            self.pipeline.clone(),
            &self.params,
            initial_block,
            self.status.read().history_source,
        );

        tasks.push(tokio::spawn(run_forward(forward, self.context())));
        tasks.push(tokio::spawn(run_backward(backward, self.context())));
        info!(initial_block, "[sf-04] Scan drivers started");
        Ok(())
    }

    async fn scan_history(&self) -> bool {
        {
            let mut status = self.status.write();
            if status.no_more_past_blocks {
                return false;
            }
            status.indexer_invalid = false;
        }
        self.trigger.notify_one();
        true
    }

    async fn set_history_source(&self, source: HistorySource) {
        let changed = {
            let mut status = self.status.write();
            let changed = status.history_source != source;
            status.history_source = source;
            changed
        };
        if changed {
            self.bus
                .publish(FeedEvent::HistorySourceChanged(source))
                .await;
        }
    }

    fn status(&self) -> ScanStatus {
        self.status.read().clone()
    }

    async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(err) = task.await {
                error!(error = %err, "[sf-04] Driver task failed");
            }
        }
        info!("[sf-04] Scan controller stopped");
    }
}
