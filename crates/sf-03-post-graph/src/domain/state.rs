//! # Graph State
//!
//! Posts, posters, discussion placeholders and the four ordinal trees. The
//! only mutation path is `apply`, which folds a `GraphDelta` in.

use std::collections::HashMap;

use shared_types::{
    ChainParams, DiscussionChannel, Post, PostId, PostLookup, Poster, ScanDirection,
};

use super::delta::GraphDelta;
use super::tree::OrdinalTree;

/// Channel naming rules the graph needs from `ChainParams`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRules {
    /// Main channel id (empty).
    pub main_channel_id: String,
    /// Discussion channel prefix, e.g. `discuss:`.
    pub discussion_prefix: String,
}

impl ChannelRules {
    /// Discussion channel id of `post_id`.
    pub fn discussion_of(&self, post_id: &str) -> String {
        format!("{}{}", self.discussion_prefix, post_id)
    }

    /// Root post id of a discussion channel id, `None` for post ids.
    pub fn discussion_root<'a>(&self, id: &'a str) -> Option<&'a str> {
        id.strip_prefix(self.discussion_prefix.as_str())
    }
}

impl Default for ChannelRules {
    fn default() -> Self {
        Self::from(&ChainParams::default())
    }
}

impl From<&ChainParams> for ChannelRules {
    fn from(params: &ChainParams) -> Self {
        Self {
            main_channel_id: params.main_channel_id.clone(),
            discussion_prefix: params.discussion_prefix.clone(),
        }
    }
}

/// Insertion point for the root posts of one batch.
///
/// Forward batches prepend their roots as a block, keeping in-batch order;
/// backward batches append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    /// Direction of the batch.
    pub direction: ScanDirection,
    next_root_slot: usize,
}

impl BatchCursor {
    /// Cursor at the start of a new batch.
    pub fn new(direction: ScanDirection) -> Self {
        Self {
            direction,
            next_root_slot: 0,
        }
    }
}

/// The complete reconciled feed.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub(crate) rules: ChannelRules,
    pub(crate) posts: HashMap<PostId, Post>,
    pub(crate) posters: HashMap<String, Poster>,
    pub(crate) channels: HashMap<String, DiscussionChannel>,
    pub(crate) ordered_root_ids: Vec<PostId>,
    pub(crate) reply_tree: OrdinalTree,
    pub(crate) forward_orphans: OrdinalTree,
    pub(crate) backward_orphans: OrdinalTree,
    pub(crate) deorphaned: OrdinalTree,
}

impl GraphState {
    /// Create an empty graph.
    pub fn new(rules: ChannelRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Channel naming rules.
    pub fn rules(&self) -> &ChannelRules {
        &self.rules
    }

    /// A stored post.
    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.get(post_id)
    }

    /// A stored poster.
    pub fn poster(&self, address: &str) -> Option<&Poster> {
        self.posters.get(address)
    }

    /// A stored discussion placeholder.
    pub fn channel(&self, channel_id: &str) -> Option<&DiscussionChannel> {
        self.channels.get(channel_id)
    }

    /// Number of stored posts.
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Root post ids, newest batch of forward roots first.
    pub fn ordered_root_ids(&self) -> &[PostId] {
        &self.ordered_root_ids
    }

    /// Authoritative attached adjacency.
    pub fn reply_tree(&self) -> &OrdinalTree {
        &self.reply_tree
    }

    /// Orphan tree fed by `direction`.
    pub fn orphan_tree(&self, direction: ScanDirection) -> &OrdinalTree {
        match direction {
            ScanDirection::Forward => &self.forward_orphans,
            ScanDirection::Backward => &self.backward_orphans,
        }
    }

    /// Edges repaired by the de-orphan cascade.
    pub fn deorphaned_tree(&self) -> &OrdinalTree {
        &self.deorphaned
    }

    /// Whether `id` (a post id or a discussion channel id) is a known,
    /// non-orphaned parent. A discussion channel is attached exactly when
    /// the post it discusses is.
    pub fn parent_attached(&self, id: &str) -> bool {
        match self.rules.discussion_root(id) {
            Some(root) => self.parent_attached(root),
            None => self.posts.get(id).is_some_and(|post| !post.orphaned),
        }
    }

    /// Fold a delta in. Root ids are positioned through `cursor`.
    pub fn apply(&mut self, delta: GraphDelta, cursor: &mut BatchCursor) {
        if let Some(poster) = delta.new_poster {
            self.posters.entry(poster.address.clone()).or_insert(poster);
        }
        if let Some(channel) = delta.channel {
            self.channels.insert(channel.channel_id.clone(), channel);
        }
        for (channel_id, orphaned) in delta.channel_mutations {
            if let Some(channel) = self.channels.get_mut(&channel_id) {
                channel.orphaned = orphaned;
            }
        }
        for mutation in delta.post_mutations {
            if let Some(post) = self.posts.get_mut(&mutation.post_id) {
                post.orphaned = mutation.orphaned;
            }
        }
        for slot in &delta.forward_orphans {
            self.forward_orphans.write(slot);
        }
        for slot in &delta.backward_orphans {
            self.backward_orphans.write(slot);
        }
        for slot in &delta.reply_tree {
            self.reply_tree.write(slot);
        }
        for slot in &delta.deorphaned {
            self.deorphaned.write(slot);
        }
        if let Some(root) = delta.new_root {
            match cursor.direction {
                ScanDirection::Forward => {
                    let at = cursor.next_root_slot.min(self.ordered_root_ids.len());
                    self.ordered_root_ids.insert(at, root);
                    cursor.next_root_slot = at + 1;
                }
                ScanDirection::Backward => self.ordered_root_ids.push(root),
            }
        }
        if let Some(post) = delta.new_post {
            self.posts.insert(post.post_id.clone(), post);
        }
    }
}

impl PostLookup for GraphState {
    fn post_timestamp(&self, post_id: &str) -> Option<u64> {
        self.posts.get(post_id).map(|post| post.timestamp)
    }

    fn is_attached(&self, post_id: &str) -> Option<bool> {
        self.posts.get(post_id).map(|post| !post.orphaned)
    }

    fn knows_poster(&self, address: &str) -> bool {
        self.posters.contains_key(address)
    }
}
