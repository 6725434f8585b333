//! # Post Graph Store
//!
//! Single owner of the mutable feed. Both scan drivers share one
//! `Arc<PostGraphStore>`; every merge computes its delta and applies it
//! under the same write lock, while reads take the read lock.

use parking_lot::RwLock;
use tracing::debug;

use feed_telemetry::{GRAPH_DEORPHANED, GRAPH_ORPHANS, GRAPH_POSTS};
use shared_types::{ChainParams, Post, PostCandidate, PostId, PostLookup, ScanDirection};

use crate::domain::{
    reconcile, BatchCursor, ChannelRules, ChildRef, FeedSnapshot, GraphState, ThreadView,
};
use crate::ports::{MergeOutcome, PostGraphApi};

/// Thread-safe post graph.
pub struct PostGraphStore {
    state: RwLock<GraphState>,
}

impl PostGraphStore {
    /// Create an empty store using the channel rules of `params`.
    pub fn new(params: &ChainParams) -> Self {
        Self {
            state: RwLock::new(GraphState::new(ChannelRules::from(params))),
        }
    }

    /// Run `f` against a consistent read view.
    pub fn read<T>(&self, f: impl FnOnce(&GraphState) -> T) -> T {
        f(&self.state.read())
    }

    /// A stored post.
    pub fn post(&self, post_id: &str) -> Option<Post> {
        self.state.read().post(post_id).cloned()
    }

    /// Number of stored posts.
    pub fn post_count(&self) -> usize {
        self.state.read().post_count()
    }

    /// Root post ids in display order.
    pub fn ordered_root_ids(&self) -> Vec<PostId> {
        self.state.read().ordered_root_ids().to_vec()
    }

    /// Attached children of `parent`.
    pub fn children_of(&self, parent: &str) -> Vec<ChildRef> {
        self.state.read().children_of(parent)
    }

    /// Thread view of `post_id`.
    pub fn thread(&self, post_id: &str) -> Option<ThreadView> {
        self.state.read().thread(post_id)
    }

    /// Root posts authored by `address`.
    pub fn root_posts_by(&self, address: &str) -> Vec<Post> {
        self.state.read().root_posts_by(address)
    }
}

impl PostLookup for PostGraphStore {
    fn post_timestamp(&self, post_id: &str) -> Option<u64> {
        self.state.read().post_timestamp(post_id)
    }

    fn is_attached(&self, post_id: &str) -> Option<bool> {
        self.state.read().is_attached(post_id)
    }

    fn knows_poster(&self, address: &str) -> bool {
        self.state.read().knows_poster(address)
    }
}

impl PostGraphApi for PostGraphStore {
    fn begin_batch(&self, direction: ScanDirection) -> BatchCursor {
        BatchCursor::new(direction)
    }

    fn submit(&self, cursor: &mut BatchCursor, candidate: &PostCandidate) -> MergeOutcome {
        let mut state = self.state.write();
        let delta = reconcile(&state, candidate, cursor.direction);
        if delta.is_empty() {
            debug!(
                "[sf-03] Post {} already known, skipping",
                candidate.post.post_id
            );
            return MergeOutcome::default();
        }

        let orphaned = delta.new_post.as_ref().is_some_and(|p| p.orphaned);
        let deorphaned = delta.deorphaned_ids();
        state.apply(delta, cursor);
        drop(state);

        GRAPH_POSTS.inc();
        if orphaned {
            GRAPH_ORPHANS
                .with_label_values(&[cursor.direction.as_str()])
                .inc();
        }
        GRAPH_DEORPHANED.inc_by(deorphaned.len() as u64);

        debug!(
            post_id = %candidate.post.post_id,
            direction = %cursor.direction,
            orphaned,
            deorphaned = deorphaned.len(),
            "[sf-03] Post merged"
        );

        MergeOutcome {
            inserted: true,
            orphaned,
            deorphaned,
        }
    }

    fn snapshot(&self) -> FeedSnapshot {
        self.state.read().snapshot()
    }
}
