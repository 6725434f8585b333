//! # Scan Batches
//!
//! What a source hands to a driver: the transactions of one block or one
//! indexer page, in the order they must be decoded.

use shared_types::PendingTx;

use super::cursor::PageStep;

/// Transactions to decode against one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBatch {
    /// Transactions in arrival order.
    pub transactions: Vec<PendingTx>,
    /// Contract the transactions must target.
    pub contract: String,
    /// Block height, for block-walk batches.
    pub height: Option<u64>,
}

impl ScanBatch {
    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the batch carries no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Result of walking one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockScan {
    /// The block carries transactions.
    Block(ScanBatch),
    /// The block exists but carries none.
    Empty {
        /// Block height.
        height: u64,
        /// Contract subsequent heights target.
        contract: String,
    },
}

impl BlockScan {
    /// Height of the walked block.
    pub fn height(&self) -> u64 {
        match self {
            BlockScan::Block(batch) => batch.height.unwrap_or_default(),
            BlockScan::Empty { height, .. } => *height,
        }
    }

    /// Contract the walked block was matched against.
    pub fn contract(&self) -> &str {
        match self {
            BlockScan::Block(batch) => &batch.contract,
            BlockScan::Empty { contract, .. } => contract,
        }
    }
}

/// Result of requesting one indexer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerScan {
    /// A page, possibly without any post transaction after filtering.
    Page {
        /// Filtered transactions.
        batch: ScanBatch,
        /// Cursor state once the batch is processed.
        step: PageStep,
    },
    /// Both contracts exhausted.
    Finished,
}
