//! # Backward Driver
//!
//! Backfills history down to the first relevant block, from the node by
//! block walk or from the indexer by pages. Both sources share one
//! `BackwardCursor`, so the source can change between steps.

use feed_telemetry::{SCAN_BATCHES, SCAN_BATCH_DURATION, SCAN_WATERMARK};
use shared_bus::HistorySource;
use sf_02_scan_sources::{
    BackwardCursor, BlockScan, BlockWalkSource, IndexerScan, IndexerSource, SourceError,
};
use shared_types::{ChainParams, IndexerApi, NodeRpc, ScanDirection};
use tracing::{debug, info};

use super::pipeline::BatchPipeline;
use crate::domain::{BatchReport, StepError, StepOutcome};

/// Backward scan driver.
pub struct BackwardDriver<R: NodeRpc, I: IndexerApi> {
    block_walk: BlockWalkSource<R>,
    indexer: IndexerSource<I, R>,
    pipeline: BatchPipeline,
    first_block: u64,
    initial_block: u64,
    history_source: HistorySource,
    cursor: BackwardCursor,
}

impl<R: NodeRpc, I: IndexerApi> BackwardDriver<R, I> {
    /// Create a driver that starts just below `initial_block`.
    pub fn new(
        block_walk: BlockWalkSource<R>,
        indexer: IndexerSource<I, R>,
        pipeline: BatchPipeline,
        params: &ChainParams,
        initial_block: u64,
        history_source: HistorySource,
    ) -> Self {
        Self {
            block_walk,
            indexer,
            pipeline,
            first_block: params.first_block,
            initial_block,
            history_source,
            cursor: BackwardCursor::new(params.contract_v2.clone()),
        }
    }

    /// Current position.
    pub fn cursor(&self) -> &BackwardCursor {
        &self.cursor
    }

    /// Active history source.
    pub fn history_source(&self) -> HistorySource {
        self.history_source
    }

    /// Switch the history source; the watermark carries over.
    pub fn set_history_source(&mut self, source: HistorySource) {
        if self.history_source != source {
            info!(
                from = self.history_source.as_str(),
                to = source.as_str(),
                watermark = ?self.cursor.watermark(),
                "[sf-04] Backward: history source switched"
            );
            self.history_source = source;
        }
    }

    /// Whether the indexer serves the posting contract.
    pub async fn validate_indexer(&self) -> Result<bool, StepError> {
        Ok(self.indexer.validate().await?)
    }

    /// Process the next height or page.
    pub async fn step(&mut self) -> Result<StepOutcome, StepError> {
        match self.history_source {
            HistorySource::Rpc => self.step_block_walk().await,
            HistorySource::Indexer => self.step_indexer().await,
        }
    }

    async fn step_block_walk(&mut self) -> Result<StepOutcome, StepError> {
        let pending = self.cursor.next_pending_block(self.initial_block);
        if pending < self.first_block {
            return Ok(StepOutcome::Finished);
        }

        let scan = match self
            .block_walk
            .scan(pending, &self.cursor.active_contract, ScanDirection::Backward)
            .await
        {
            Ok(scan) => scan,
            Err(SourceError::NoBlock(height)) => {
                debug!(height, "[sf-04] Backward: node has no block at height");
                return Ok(StepOutcome::Idle);
            }
            Err(e) => return Err(e.into()),
        };

        let report = match &scan {
            BlockScan::Empty { .. } => BatchReport::default(),
            BlockScan::Block(batch) => {
                let _timer = SCAN_BATCH_DURATION.start_timer();
                let report = self.pipeline.process(batch, ScanDirection::Backward).await?;
                SCAN_BATCHES.with_label_values(&["backward", "rpc"]).inc();
                report
            }
        };

        self.cursor.commit_block(pending, scan.contract());
        Ok(self.advanced(pending, report))
    }

    async fn step_indexer(&mut self) -> Result<StepOutcome, StepError> {
        let (batch, step) = match self.indexer.next_page(&self.cursor).await? {
            IndexerScan::Finished => return Ok(StepOutcome::Finished),
            IndexerScan::Page { batch, step } => (batch, step),
        };

        let report = {
            let _timer = SCAN_BATCH_DURATION.start_timer();
            self.pipeline.process(&batch, ScanDirection::Backward).await?
        };
        SCAN_BATCHES.with_label_values(&["backward", "indexer"]).inc();

        let last_height = match &report.last_valid {
            Some(tx) => match tx.block_height {
                Some(height) => Some(height),
                None => self.indexer.resolve_block_height(&tx.tx_hash).await?,
            },
            None => None,
        };

        self.cursor.commit_page(step, last_height);
        match (last_height, self.cursor.watermark()) {
            (Some(_), Some(watermark)) => Ok(self.advanced(watermark, report)),
            _ => Ok(StepOutcome::Paged { report }),
        }
    }

    fn advanced(&self, height: u64, report: BatchReport) -> StepOutcome {
        SCAN_WATERMARK
            .with_label_values(&["backward"])
            .set(height as i64);
        if height <= self.first_block {
            info!(height, "[sf-04] Backward: reached the first relevant block");
        }
        StepOutcome::Advanced { height, report }
    }

    /// Whether the last committed height is at or below the first
    /// relevant block.
    pub fn reached_floor(&self) -> bool {
        self.cursor
            .watermark()
            .is_some_and(|height| height <= self.first_block)
    }
}
