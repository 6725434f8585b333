//! # Driver Progress
//!
//! Forward cursor, per-step reports and the status surfaced to observers.

use serde::{Deserialize, Serialize};

use shared_bus::HistorySource;
use shared_types::{PendingTx, PostId};

/// Forward driver position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardCursor {
    /// Highest height processed.
    pub current_block_captured: Option<u64>,
}

impl ForwardCursor {
    /// Next height to walk.
    pub fn next_pending_block(&self, initial_block: u64) -> u64 {
        self.current_block_captured
            .map_or(initial_block, |current| current + 1)
    }

    /// Record a processed height.
    pub fn commit(&mut self, height: u64) {
        self.current_block_captured = Some(height);
    }
}

/// What one batch did to the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Newly inserted post ids, in merge order.
    pub inserted: Vec<PostId>,
    /// Posts promoted out of the orphan trees.
    pub deorphaned: Vec<PostId>,
    /// Transactions skipped by the decoder.
    pub skipped: usize,
    /// Last transaction that carried a post, new or already known.
    pub last_valid: Option<PendingTx>,
}

/// Result of one driver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A height was processed and committed.
    Advanced {
        /// Committed watermark.
        height: u64,
        /// Graph changes.
        report: BatchReport,
    },
    /// An indexer page was processed without moving the watermark.
    Paged {
        /// Graph changes.
        report: BatchReport,
    },
    /// Nothing to do yet (block not produced).
    Idle,
    /// History is exhausted.
    Finished,
}

impl StepOutcome {
    /// Graph changes of the step, if any.
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            StepOutcome::Advanced { report, .. } | StepOutcome::Paged { report } => Some(report),
            StepOutcome::Idle | StepOutcome::Finished => None,
        }
    }
}

/// Controller status flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatus {
    /// Node reachable on the last call.
    pub node_available: bool,
    /// A backward burst is in progress.
    pub scanning_past_blocks: bool,
    /// History is exhausted; backward scanning will not resume.
    pub no_more_past_blocks: bool,
    /// The indexer failed and history scanning paused.
    pub indexer_invalid: bool,
    /// Active history source.
    pub history_source: HistorySource,
    /// Forward watermark.
    pub forward_watermark: Option<u64>,
    /// Backward watermark.
    pub backward_watermark: Option<u64>,
    /// Height scanning started from.
    pub initial_block: Option<u64>,
}

impl ScanStatus {
    /// Status before initialization.
    pub fn new(history_source: HistorySource) -> Self {
        Self {
            node_available: false,
            scanning_past_blocks: false,
            no_more_past_blocks: false,
            indexer_invalid: false,
            history_source,
            forward_watermark: None,
            backward_watermark: None,
            initial_block: None,
        }
    }
}
