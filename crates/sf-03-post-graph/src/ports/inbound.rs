//! # Inbound Ports
//!
//! API trait defining how scan drivers feed the post graph.

use shared_types::{PostCandidate, PostId, PostLookup, ScanDirection};

use crate::domain::{BatchCursor, FeedSnapshot};

/// Result of merging one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Whether the post was new.
    pub inserted: bool,
    /// Whether the post was parked in an orphan tree.
    pub orphaned: bool,
    /// Posts reattached by the cascade this merge triggered.
    pub deorphaned: Vec<PostId>,
}

/// Post Graph API - inbound port.
///
/// Implementations serialize merges: a delta is computed and applied under
/// one exclusive section, so two drivers never interleave half an update.
pub trait PostGraphApi: PostLookup {
    /// Start a batch scanned in `direction`.
    fn begin_batch(&self, direction: ScanDirection) -> BatchCursor;

    /// Reconcile and apply one candidate.
    fn submit(&self, cursor: &mut BatchCursor, candidate: &PostCandidate) -> MergeOutcome;

    /// Serializable copy of the whole graph.
    fn snapshot(&self) -> FeedSnapshot;
}
