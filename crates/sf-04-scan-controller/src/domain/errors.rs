//! # Error Types

use shared_types::TransportError;
use thiserror::Error;

use sf_01_event_decoder::DecodeError;
use sf_02_scan_sources::SourceError;

/// Controller lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// `start` was called twice.
    #[error("Scan drivers are already running")]
    AlreadyRunning,

    /// `start` was called before `initialize`.
    #[error("Scan controller has not been initialized")]
    NotInitialized,

    /// The node is unreachable or still syncing.
    #[error("Node not ready: {0}")]
    NodeNotReady(String),
}

/// Why a driver step could not complete. The driver pauses; nothing is
/// committed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    /// The node could not answer.
    #[error("Node unavailable: {0}")]
    Node(TransportError),

    /// The indexer could not answer.
    #[error("Indexer unavailable: {0}")]
    Indexer(TransportError),
}

impl From<SourceError> for StepError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::IndexerUnavailable(e) => StepError::Indexer(e),
            SourceError::RpcUnavailable(e) => StepError::Node(e),
            SourceError::NoBlock(height) => {
                StepError::Node(TransportError::Rpc(format!("no block at height {height}")))
            }
        }
    }
}

impl From<DecodeError> for StepError {
    fn from(err: DecodeError) -> Self {
        StepError::Node(err.transport().clone())
    }
}
