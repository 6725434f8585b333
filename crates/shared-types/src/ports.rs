//! # Outbound Ports
//!
//! Traits for the external collaborators of the feed engine: the chain
//! node RPC, the indexer API, and the read side of the post graph.

use async_trait::async_trait;

use crate::entities::Poster;
use crate::errors::TransportError;
use crate::wire::{BlockInfo, IndexerPage, SyncStatus, TxMeta, TxReceipt};

/// Chain node JSON-RPC - outbound port.
///
/// `Ok(None)` means the node answered but has no such record; `Err` means
/// the node could not answer at all.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// `bcn_blockAt`: block at a height.
    async fn fetch_block_at(&self, height: u64) -> Result<Option<BlockInfo>, TransportError>;

    /// `bcn_block`: block by hash.
    async fn fetch_block_by_hash(&self, hash: &str) -> Result<Option<BlockInfo>, TransportError>;

    /// `bcn_txReceipt`: execution receipt of a transaction.
    async fn fetch_tx_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, TransportError>;

    /// `bcn_transaction`: timestamp and enclosing block of a transaction.
    async fn fetch_tx_meta(&self, tx_hash: &str) -> Result<Option<TxMeta>, TransportError>;

    /// `dna_identity`: identity snapshot of an address.
    async fn fetch_identity(&self, address: &str) -> Result<Option<Poster>, TransportError>;

    /// `bcn_syncing`: node synchronisation state.
    async fn sync_status(&self) -> Result<Option<SyncStatus>, TransportError>;

    /// `bcn_lastBlock`: current chain head.
    async fn last_block(&self) -> Result<Option<BlockInfo>, TransportError>;
}

/// Indexer `BalanceUpdates` API - outbound port.
#[async_trait]
pub trait IndexerApi: Send + Sync {
    /// Fetch one page of balance updates of `contract`.
    async fn fetch_page(
        &self,
        contract: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<IndexerPage, TransportError>;

    /// Check the indexer serves `contract` by asking for a single item.
    async fn probe(&self, contract: &str) -> Result<bool, TransportError> {
        let page = self.fetch_page(contract, 1, None).await?;
        Ok(page.result.len() == 1 && page.result[0].address.eq_ignore_ascii_case(contract))
    }
}

/// Read access to the post graph, as seen by the decoder.
pub trait PostLookup: Send + Sync {
    /// Timestamp of a known post.
    fn post_timestamp(&self, post_id: &str) -> Option<u64>;

    /// `Some(true)` when the post is known and attached, `Some(false)` when it
    /// is known but orphaned, `None` when unknown.
    fn is_attached(&self, post_id: &str) -> Option<bool>;

    /// Whether an identity snapshot exists for `address`.
    fn knows_poster(&self, address: &str) -> bool;

    /// Whether the post is already known.
    fn contains_post(&self, post_id: &str) -> bool {
        self.post_timestamp(post_id).is_some()
    }
}
