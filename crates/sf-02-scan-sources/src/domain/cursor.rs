//! # Backward Cursor
//!
//! Position of the backward driver. The watermark is always an absolute
//! block height, whichever source produced the last batch, so the block
//! walk and the indexer can replace each other mid-scan.

use serde::{Deserialize, Serialize};

/// Pagination state of the indexer on the active contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", tag = "state", content = "token")]
pub enum Continuation {
    /// First page of the active contract.
    #[default]
    Start,
    /// Opaque token of the next page.
    Token(String),
    /// Both contracts exhausted.
    Finished,
}

impl Continuation {
    /// Token to send with the next request.
    pub fn token(&self) -> Option<&str> {
        match self {
            Continuation::Token(token) => Some(token),
            Continuation::Start | Continuation::Finished => None,
        }
    }
}

/// Backward driver position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackwardCursor {
    /// Lowest height fully or partially processed.
    pub past_block_captured: Option<u64>,
    /// Height of the last indexer item processed; the block may hold
    /// further posts, so block walking resumes at it rather than below it.
    pub partial_watermark: Option<u64>,
    /// Contract being backfilled.
    pub active_contract: String,
    /// Indexer pagination.
    pub continuation: Continuation,
}

impl BackwardCursor {
    /// A cursor that has not scanned anything yet.
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            past_block_captured: None,
            partial_watermark: None,
            active_contract: contract.into(),
            continuation: Continuation::Start,
        }
    }

    /// Next height for the block walk.
    pub fn next_pending_block(&self, initial_block: u64) -> u64 {
        match (self.past_block_captured, self.partial_watermark) {
            (Some(_), Some(partial)) => partial,
            (Some(past), None) => past.saturating_sub(1),
            (None, _) => initial_block.saturating_sub(1),
        }
    }

    /// Current watermark.
    pub fn watermark(&self) -> Option<u64> {
        self.past_block_captured
    }

    /// Whether the indexer has nothing left on either contract.
    pub fn is_finished(&self) -> bool {
        self.continuation == Continuation::Finished
    }

    /// Record a block fully processed by the block walk against `contract`.
    pub fn commit_block(&mut self, height: u64, contract: &str) {
        self.past_block_captured = Some(height);
        self.partial_watermark = None;
        if !self.active_contract.eq_ignore_ascii_case(contract) {
            self.active_contract = contract.to_string();
            self.continuation = Continuation::Start;
        }
    }

    /// Record an indexer page: the pagination step and, when the page held
    /// a valid post, the height of its last one.
    ///
    /// The watermark only moves down. A page re-served above it, as when the
    /// indexer restarts from its first page after a block walk, leaves the
    /// position untouched.
    pub fn commit_page(&mut self, step: PageStep, last_height: Option<u64>) {
        self.active_contract = step.contract;
        self.continuation = step.continuation;
        if let Some(height) = last_height {
            if self.past_block_captured.map_or(true, |past| height <= past) {
                self.past_block_captured = Some(height);
                self.partial_watermark = Some(height);
            }
        }
    }
}

/// Cursor state to adopt once an indexer page has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStep {
    /// Contract of the next request.
    pub contract: String,
    /// Pagination of the next request.
    pub continuation: Continuation,
}
