//! # Wire Records
//!
//! Response shapes of the node RPC (`bcn_*`, `dna_*`) and the indexer
//! `BalanceUpdates` endpoint. Only the fields the feed engine reads are kept.

use serde::{Deserialize, Serialize};

use crate::entities::TxHash;

/// Result of `bcn_blockAt` / `bcn_block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Block timestamp (UNIX seconds).
    pub timestamp: u64,
    /// Block hash.
    #[serde(default)]
    pub hash: String,
    /// Transaction hashes; `None` when the block carries none.
    #[serde(default)]
    pub transactions: Option<Vec<TxHash>>,
}

/// One event emitted during contract execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TxEvent {
    /// Event name.
    #[serde(default)]
    pub event: String,
    /// Hex-encoded arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Result of `bcn_txReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Contract address (lowercase).
    #[serde(default)]
    pub contract: String,
    /// Invoked method name.
    #[serde(default)]
    pub method: String,
    /// Whether execution succeeded.
    #[serde(default)]
    pub success: bool,
    /// Emitted events.
    #[serde(default)]
    pub events: Vec<TxEvent>,
}

/// Subset of `bcn_transaction` used by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxMeta {
    /// Transaction timestamp (UNIX seconds).
    pub timestamp: u64,
    /// Hash of the enclosing block.
    #[serde(default)]
    pub block_hash: String,
}

/// Result of `bcn_syncing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Whether the node is still catching up.
    pub syncing: bool,
    /// Current local height.
    #[serde(default)]
    pub current_block: u64,
    /// Highest known height.
    #[serde(default)]
    pub highest_block: u64,
}

/// Receipt summary embedded in indexer balance updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexerReceipt {
    /// Invoked method name.
    #[serde(default)]
    pub method: String,
    /// Whether execution succeeded.
    #[serde(default)]
    pub success: bool,
}

/// One item of the indexer `BalanceUpdates` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdate {
    /// Transaction hash.
    pub hash: TxHash,
    /// Transaction type, e.g. `CallContract`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// ISO-8601 transaction timestamp.
    #[serde(default)]
    pub timestamp: String,
    /// Address the balance update applies to.
    #[serde(default)]
    pub address: String,
    /// Receipt summary, absent for plain transfers.
    #[serde(default)]
    pub tx_receipt: Option<IndexerReceipt>,
}

/// One page of the indexer listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexerPage {
    /// Items, newest first.
    #[serde(default)]
    pub result: Vec<BalanceUpdate>,
    /// Opaque token for the next page; absent on the last page.
    #[serde(default)]
    pub continuation_token: Option<String>,
}
