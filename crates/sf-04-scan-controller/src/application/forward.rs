//! # Forward Driver
//!
//! Walks new blocks one height per cycle against the current contract.

use feed_telemetry::{SCAN_BATCHES, SCAN_BATCH_DURATION, SCAN_WATERMARK};
use sf_02_scan_sources::{BlockScan, BlockWalkSource, SourceError};
use shared_types::{ChainParams, NodeRpc, ScanDirection};
use tracing::{debug, info};

use super::pipeline::BatchPipeline;
use crate::domain::{BatchReport, ForwardCursor, StepError, StepOutcome};

/// Forward scan driver.
pub struct ForwardDriver<R: NodeRpc> {
    source: BlockWalkSource<R>,
    pipeline: BatchPipeline,
    contract: String,
    initial_block: u64,
    cursor: ForwardCursor,
}

impl<R: NodeRpc> ForwardDriver<R> {
    /// Create a driver starting at `initial_block`.
    pub fn new(
        source: BlockWalkSource<R>,
        pipeline: BatchPipeline,
        params: &ChainParams,
        initial_block: u64,
    ) -> Self {
        Self {
            source,
            pipeline,
            contract: params.contract_v2.clone(),
            initial_block,
            cursor: ForwardCursor::default(),
        }
    }

    /// Current position.
    pub fn cursor(&self) -> ForwardCursor {
        self.cursor
    }

    /// Process the next height. The watermark moves only once the whole
    /// block has been merged.
    pub async fn step(&mut self) -> Result<StepOutcome, StepError> {
        let pending = self.cursor.next_pending_block(self.initial_block);

        let scan = match self
            .source
            .scan(pending, &self.contract, ScanDirection::Forward)
            .await
        {
            Ok(scan) => scan,
            Err(SourceError::NoBlock(height)) => {
                debug!(height, "[sf-04] Forward: block not produced yet");
                return Ok(StepOutcome::Idle);
            }
            Err(e) => return Err(e.into()),
        };

        let report = match &scan {
            BlockScan::Empty { .. } => BatchReport::default(),
            BlockScan::Block(batch) => {
                let _timer = SCAN_BATCH_DURATION.start_timer();
                let report = self.pipeline.process(batch, ScanDirection::Forward).await?;
                SCAN_BATCHES.with_label_values(&["forward", "rpc"]).inc();
                if !report.inserted.is_empty() {
                    info!(
                        height = pending,
                        posts = report.inserted.len(),
                        "[sf-04] Forward: new posts"
                    );
                }
                report
            }
        };

        self.cursor.commit(pending);
        SCAN_WATERMARK
            .with_label_values(&["forward"])
            .set(pending as i64);

        Ok(StepOutcome::Advanced {
            height: pending,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_01_event_decoder::EventDecoder;
    use sf_03_post_graph::PostGraphStore;
    use shared_types::{MockNodeRpc, PostTxSpec};
    use std::sync::Arc;

    fn driver(initial: u64) -> (Arc<MockNodeRpc>, ForwardDriver<MockNodeRpc>, ChainParams) {
        let params = ChainParams::for_testing();
        let node = Arc::new(MockNodeRpc::new());
        let decoder = Arc::new(EventDecoder::new(node.clone(), params.clone()));
        let pipeline = BatchPipeline::new(decoder, Arc::new(PostGraphStore::new(&params)));
        let source = BlockWalkSource::new(node.clone(), params.clone());
        (
            node,
            ForwardDriver::new(source, pipeline, &params, initial),
            params,
        )
    }

    #[tokio::test]
    async fn test_walks_forward_and_waits_for_new_blocks() {
        let (node, mut driver, params) = driver(100);
        node.add_empty_block(100, 2_500);
        node.add_post(&PostTxSpec::new("0x01", 101, 2_520, &params.contract_v2, 1, "hi"));

        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 100, .. }
        ));
        let StepOutcome::Advanced { height, report } = driver.step().await.unwrap() else {
            panic!("expected block 101");
        };
        assert_eq!(height, 101);
        assert_eq!(report.inserted, vec!["1".to_string()]);

        assert_eq!(driver.step().await.unwrap(), StepOutcome::Idle);
        assert_eq!(driver.cursor().current_block_captured, Some(101));
    }

    #[tokio::test]
    async fn test_offline_node_keeps_watermark() {
        let (node, mut driver, _params) = driver(100);
        node.add_empty_block(100, 2_500);
        node.set_unavailable(true);
        assert!(matches!(driver.step().await, Err(StepError::Node(_))));
        assert_eq!(driver.cursor().current_block_captured, None);

        node.set_unavailable(false);
        assert!(driver.step().await.is_ok());
        assert_eq!(driver.cursor().current_block_captured, Some(100));
    }
}
