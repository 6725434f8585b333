//! # Error Types
//!
//! Source-level failures. Empty blocks and exhausted pagination are
//! outcomes, not errors.

use shared_types::TransportError;
use thiserror::Error;

/// Scan source errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The node could not answer.
    #[error("Node RPC unavailable: {0}")]
    RpcUnavailable(#[source] TransportError),

    /// The indexer could not answer.
    #[error("Indexer API unavailable: {0}")]
    IndexerUnavailable(#[source] TransportError),

    /// The node has no block at this height yet.
    #[error("No block at height {0}")]
    NoBlock(u64),
}

impl SourceError {
    /// Whether the node transport failed.
    pub fn is_rpc_unavailable(&self) -> bool {
        matches!(self, SourceError::RpcUnavailable(_))
    }
}
