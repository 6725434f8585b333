//! # Integration Flows
//!
//! Shared fixtures: a mock node, a mock indexer and the decode-then-merge
//! pipeline wired exactly as the scan controller wires them.

pub mod controller_flow;
pub mod history;
pub mod reconciliation;

use std::sync::Arc;

use sf_01_event_decoder::EventDecoder;
use sf_02_scan_sources::{BlockWalkSource, IndexerSource, ScanBatch};
use sf_03_post_graph::PostGraphStore;
use sf_04_scan_controller::{BackwardDriver, BatchPipeline, BatchReport};
use shared_bus::HistorySource;
use shared_types::{ChainParams, MockIndexerApi, MockNodeRpc, PendingTx, ScanDirection};

/// Mock collaborators plus one pipeline over a fresh graph.
pub struct Harness {
    pub params: ChainParams,
    pub node: Arc<MockNodeRpc>,
    pub indexer: Arc<MockIndexerApi>,
    pub graph: Arc<PostGraphStore>,
    pub decoder: Arc<EventDecoder<MockNodeRpc>>,
    pub pipeline: BatchPipeline,
}

impl Harness {
    pub fn new() -> Self {
        let params = ChainParams::for_testing();
        let node = Arc::new(MockNodeRpc::new());
        let graph = Arc::new(PostGraphStore::new(&params));
        let decoder = Arc::new(EventDecoder::new(node.clone(), params.clone()));
        Self {
            pipeline: BatchPipeline::new(decoder.clone(), graph.clone()),
            decoder,
            indexer: Arc::new(MockIndexerApi::new()),
            params,
            node,
            graph,
        }
    }

    /// Decode and merge `hashes` as one batch targeting `contract`.
    pub async fn merge(
        &self,
        hashes: &[&str],
        contract: &str,
        direction: ScanDirection,
    ) -> BatchReport {
        let batch = ScanBatch {
            transactions: hashes.iter().map(|h| PendingTx::new(*h)).collect(),
            contract: contract.to_string(),
            height: None,
        };
        self.pipeline
            .process(&batch, direction)
            .await
            .expect("mock node is online")
    }

    /// A backward driver over this harness, starting below `initial_block`.
    pub fn backward_driver(
        &self,
        initial_block: u64,
        source: HistorySource,
    ) -> BackwardDriver<MockNodeRpc, MockIndexerApi> {
        BackwardDriver::new(
            BlockWalkSource::new(self.node.clone(), self.params.clone()),
            IndexerSource::new(
                self.indexer.clone(),
                self.node.clone(),
                self.params.clone(),
                10,
            ),
            self.pipeline.clone(),
            &self.params,
            initial_block,
            source,
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
