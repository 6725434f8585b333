//! # Graph Delta
//!
//! The change set the reconciler computes for one candidate. Deltas are
//! applied by the store under its write lock; computing one never mutates
//! shared state.

use shared_types::{DiscussionChannel, Post, PostId, Poster};

use super::tree::TreeSlot;

/// Flip of a stored post's `orphaned` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMutation {
    /// Affected post.
    pub post_id: PostId,
    /// New flag value.
    pub orphaned: bool,
}

/// Change set produced by reconciling one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDelta {
    /// The placed post, `orphaned` already decided.
    pub new_post: Option<Post>,
    /// Author identity, when first sighted.
    pub new_poster: Option<Poster>,
    /// Root post id to add to the ordered root list.
    pub new_root: Option<PostId>,
    /// Discussion channel placeholder inserted or refreshed.
    pub channel: Option<DiscussionChannel>,
    /// Reply tree appends.
    pub reply_tree: Vec<TreeSlot>,
    /// Forward-orphan appends and clears.
    pub forward_orphans: Vec<TreeSlot>,
    /// Backward-orphan appends and clears.
    pub backward_orphans: Vec<TreeSlot>,
    /// De-orphaned tree appends.
    pub deorphaned: Vec<TreeSlot>,
    /// `orphaned` flips of existing posts.
    pub post_mutations: Vec<PostMutation>,
    /// `orphaned` flips of existing discussion placeholders.
    pub channel_mutations: Vec<(String, bool)>,
}

impl GraphDelta {
    /// Whether applying this delta would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Ids promoted by the de-orphan cascade, in promotion order.
    pub fn deorphaned_ids(&self) -> Vec<PostId> {
        self.post_mutations
            .iter()
            .filter(|m| !m.orphaned)
            .map(|m| m.post_id.clone())
            .collect()
    }
}
