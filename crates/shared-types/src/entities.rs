//! # Core Domain Entities
//!
//! Defines the feed entities reconstructed from contract events.
//!
//! ## Clusters
//!
//! - **Content**: `Post`, `PostCandidate`, `DiscussionChannel`
//! - **Identity**: `Poster`
//! - **Scanning**: `PendingTx`, `ScanDirection`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a post. May carry the legacy prefix for ids minted by the
/// pre-migration contract.
pub type PostId = String;

/// A chain address in its textual `0x…` form.
pub type Address = String;

/// A transaction hash in its textual `0x…` form.
pub type TxHash = String;

// =============================================================================
// CLUSTER A: CONTENT
// =============================================================================

/// A post decoded from a `makePost` contract event.
///
/// Posts are immutable once inserted into the graph, except for `orphaned`,
/// which flips as reply chains are repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post identifier.
    pub post_id: PostId,
    /// Address of the author.
    pub poster: Address,
    /// Sanitized message text.
    pub message: String,
    /// UNIX seconds of the enclosing transaction.
    pub timestamp: u64,
    /// Hash of the enclosing transaction.
    pub tx_hash: TxHash,
    /// Height of the enclosing block, when the source supplied it.
    #[serde(default)]
    pub block_height: Option<u64>,
    /// Declared reply target; empty for root posts.
    #[serde(default)]
    pub reply_to_post_id: PostId,
    /// Channel the post was made on; empty for the main channel.
    #[serde(default)]
    pub channel_id: String,
    /// Whether the post hangs off a parent that is unknown or itself orphaned.
    #[serde(default)]
    pub orphaned: bool,
}

impl Post {
    /// A root post has no reply target and lives on the main channel.
    pub fn is_root(&self, main_channel_id: &str) -> bool {
        self.reply_to_post_id.is_empty() && self.channel_id == main_channel_id
    }

    /// Whether the post is a comment on a discussion channel.
    pub fn is_discussion_comment(&self, main_channel_id: &str) -> bool {
        self.channel_id != main_channel_id
    }
}

/// Synthetic parent of discussion comments: `"<prefix><rootPostId>"`.
///
/// The decoder pre-seeds one of these for every comment it decodes so that
/// the channel can be placed and cascaded like any other parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionChannel {
    /// Full channel id, e.g. `discuss:42`.
    pub channel_id: String,
    /// Post whose discussion this channel carries.
    pub root_post_id: PostId,
    /// Inherited orphan status of `root_post_id` at decode time.
    pub orphaned: bool,
}

/// Output of the event decoder, consumed by the post graph reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCandidate {
    /// The decoded post, not yet placed (`orphaned == false`).
    pub post: Post,
    /// Identity of the author when first sighted by this decode.
    pub new_poster: Option<Poster>,
    /// Channel placeholder, present only for discussion comments.
    pub discussion: Option<DiscussionChannel>,
}

impl PostCandidate {
    /// Parent used for tree bookkeeping: the discussion channel for comments,
    /// the declared reply target otherwise. Empty for root posts.
    pub fn placement_target(&self) -> &str {
        match &self.discussion {
            Some(channel) => &channel.channel_id,
            None => &self.post.reply_to_post_id,
        }
    }
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// Snapshot of an author's on-chain identity, taken on first sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
    /// Identity address.
    pub address: Address,
    /// Stake as reported by the node (decimal string).
    #[serde(default)]
    pub stake: String,
    /// Identity age in epochs.
    #[serde(default)]
    pub age: u64,
    /// Public key (hex).
    #[serde(default)]
    pub pubkey: String,
    /// Identity state (e.g. `Human`, `Verified`, `Newbie`).
    #[serde(default)]
    pub state: String,
}

impl Poster {
    /// Placeholder used when the node has no identity record for an address.
    pub fn unknown(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            state: "Undefined".to_string(),
            ..Self::default()
        }
    }
}

// =============================================================================
// CLUSTER C: SCANNING
// =============================================================================

/// A transaction handed from a scan source to the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTx {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Timestamp, when the source already knows it (indexer pages do).
    #[serde(default)]
    pub timestamp: Option<u64>,
    /// Enclosing block height, when the source already knows it.
    #[serde(default)]
    pub block_height: Option<u64>,
}

impl PendingTx {
    /// A transaction known only by hash.
    pub fn new(tx_hash: impl Into<TxHash>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            timestamp: None,
            block_height: None,
        }
    }
}

/// Direction of a scan driver.
///
/// Forward scanning walks newest blocks as they are produced; backward
/// scanning backfills history. The direction decides which orphan tree
/// receives a post whose parent is not yet attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    /// Live scanning of new blocks.
    Forward,
    /// Historical backfill.
    Backward,
}

impl ScanDirection {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanDirection::Forward => "forward",
            ScanDirection::Backward => "backward",
        }
    }
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
