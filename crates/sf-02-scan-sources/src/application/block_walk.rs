//! # Block-Walk Source
//!
//! Fetches one block per call. Used by the forward driver always and by
//! the backward driver when history comes from the node alone.

use std::sync::Arc;

use tracing::{debug, trace};

use feed_telemetry::SCAN_BLOCKS_SCANNED;
use shared_types::{ChainParams, NodeRpc, PendingTx, ScanDirection};

use crate::domain::{BlockScan, ScanBatch, SourceError};

/// Block walker over a node RPC.
pub struct BlockWalkSource<R: NodeRpc> {
    rpc: Arc<R>,
    params: ChainParams,
}

impl<R: NodeRpc> BlockWalkSource<R> {
    /// Create a block walker.
    pub fn new(rpc: Arc<R>, params: ChainParams) -> Self {
        Self { rpc, params }
    }

    /// Walk the block at `height`, matching transactions against
    /// `contract`. Walking backward into a pre-v5 block switches to the
    /// legacy contract; the returned scan carries the contract in effect.
    pub async fn scan(
        &self,
        height: u64,
        contract: &str,
        direction: ScanDirection,
    ) -> Result<BlockScan, SourceError> {
        let block = self
            .rpc
            .fetch_block_at(height)
            .await
            .map_err(SourceError::RpcUnavailable)?
            .ok_or(SourceError::NoBlock(height))?;

        SCAN_BLOCKS_SCANNED
            .with_label_values(&[direction.as_str()])
            .inc();

        let contract = if direction == ScanDirection::Backward
            && block.timestamp < self.params.v5_timestamp
            && !contract.eq_ignore_ascii_case(&self.params.contract_v1)
        {
            debug!(
                height,
                "[sf-02] Block predates the contract migration, switching to legacy contract"
            );
            self.params.contract_v1.clone()
        } else {
            contract.to_string()
        };

        let Some(hashes) = block.transactions.filter(|txs| !txs.is_empty()) else {
            trace!(height, %direction, "[sf-02] Block carries no transactions");
            return Ok(BlockScan::Empty { height, contract });
        };

        let transactions = hashes
            .into_iter()
            .map(|tx_hash| PendingTx {
                tx_hash,
                timestamp: Some(block.timestamp),
                block_height: Some(block.height),
            })
            .collect();

        Ok(BlockScan::Block(ScanBatch {
            transactions,
            contract,
            height: Some(block.height),
        }))
    }
}
