//! # Read Views
//!
//! Shapes handed to the presentation layer. Nothing here re-derives
//! reconciliation; views only read the trees.

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{DiscussionChannel, Post, PostId, Poster};

use super::state::GraphState;

/// A child edge of the reply tree, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    /// Child post id.
    pub post_id: PostId,
    /// Whether the edge was repaired by the de-orphan cascade.
    pub deorphaned: bool,
}

/// A reply together with its discussion comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    /// The reply.
    pub post: Post,
    /// Whether the reply was reattached late.
    pub deorphaned: bool,
    /// Comments on the reply's discussion channel.
    pub comments: Vec<ChildRef>,
}

/// A post with its attached replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    /// The post the thread hangs off.
    pub post: Post,
    /// Replies in ordinal order.
    pub replies: Vec<ReplyView>,
}

/// Serializable copy of the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Root posts in display order.
    pub ordered_root_ids: Vec<PostId>,
    /// Every post by id.
    pub posts: BTreeMap<PostId, Post>,
    /// Every poster by address.
    pub posters: BTreeMap<String, Poster>,
    /// Discussion placeholders by channel id.
    pub channels: BTreeMap<String, DiscussionChannel>,
    /// Reply tree keyed `"<parent>-<index>"`.
    pub reply_tree: BTreeMap<String, PostId>,
    /// Forward-orphan tree.
    pub forward_orphans: BTreeMap<String, PostId>,
    /// Backward-orphan tree.
    pub backward_orphans: BTreeMap<String, PostId>,
    /// De-orphaned tree.
    pub deorphaned: BTreeMap<String, PostId>,
}

impl GraphState {
    /// Attached children of `parent` in ordinal order.
    pub fn children_of(&self, parent: &str) -> Vec<ChildRef> {
        self.reply_tree
            .children(parent)
            .into_iter()
            .map(|child| ChildRef {
                deorphaned: self.deorphaned.has_child(parent, &child),
                post_id: child,
            })
            .collect()
    }

    /// Replies of `post_id` and the comments on each reply's discussion.
    pub fn thread(&self, post_id: &str) -> Option<ThreadView> {
        let post = self.posts.get(post_id)?.clone();
        let replies = self
            .children_of(post_id)
            .into_iter()
            .filter_map(|child| {
                let reply = self.posts.get(&child.post_id)?.clone();
                let comments = self.children_of(&self.rules.discussion_of(&child.post_id));
                Some(ReplyView {
                    post: reply,
                    deorphaned: child.deorphaned,
                    comments,
                })
            })
            .collect();
        Some(ThreadView { post, replies })
    }

    /// Root posts authored by `address` (case-insensitive), in display order.
    pub fn root_posts_by(&self, address: &str) -> Vec<Post> {
        self.ordered_root_ids
            .iter()
            .filter_map(|id| self.posts.get(id))
            .filter(|post| post.poster.eq_ignore_ascii_case(address))
            .cloned()
            .collect()
    }

    /// Serializable copy of the graph.
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            ordered_root_ids: self.ordered_root_ids.clone(),
            posts: self
                .posts
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            posters: self
                .posters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            channels: self
                .channels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            reply_tree: self.reply_tree.to_keyed_map(),
            forward_orphans: self.forward_orphans.to_keyed_map(),
            backward_orphans: self.backward_orphans.to_keyed_map(),
            deorphaned: self.deorphaned.to_keyed_map(),
        }
    }
}
