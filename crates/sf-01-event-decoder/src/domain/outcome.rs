//! # Decode Outcomes
//!
//! A transaction either yields a candidate or is skipped for a reason.
//! Skips are data, never errors.

use std::fmt;

use shared_types::{PostCandidate, TransportError};
use thiserror::Error;

/// Why a transaction did not yield a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The node has no receipt for the transaction.
    NoReceipt,
    /// The node has no transaction record to take the timestamp from.
    UnknownTransaction,
    /// The receipt belongs to another contract.
    WrongContract,
    /// Another contract method was invoked.
    WrongMethod,
    /// Contract execution failed.
    FailedExecution,
    /// The event is missing arguments or carries undecodable ones.
    MalformedEvent,
    /// The channel is neither the main channel nor a discussion channel.
    WrongChannel,
    /// Nothing left after sanitization.
    EmptyMessage,
    /// The post targets itself.
    SelfReply,
    /// The reply target exists with a timestamp that is not earlier.
    StaleReply,
    /// The post id is already in the graph.
    AlreadyKnown,
}

impl SkipReason {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoReceipt => "no_receipt",
            SkipReason::UnknownTransaction => "unknown_transaction",
            SkipReason::WrongContract => "wrong_contract",
            SkipReason::WrongMethod => "wrong_method",
            SkipReason::FailedExecution => "failed_execution",
            SkipReason::MalformedEvent => "malformed_event",
            SkipReason::WrongChannel => "wrong_channel",
            SkipReason::EmptyMessage => "empty_message",
            SkipReason::SelfReply => "self_reply",
            SkipReason::StaleReply => "stale_reply",
            SkipReason::AlreadyKnown => "already_known",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of decoding one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A post ready for reconciliation.
    Candidate(Box<PostCandidate>),
    /// Not a post; continue with the next transaction.
    Skip(SkipReason),
}

impl Decoded {
    /// The candidate, if any.
    pub fn candidate(&self) -> Option<&PostCandidate> {
        match self {
            Decoded::Candidate(c) => Some(c),
            Decoded::Skip(_) => None,
        }
    }

    /// The skip reason, if any.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Decoded::Candidate(_) => None,
            Decoded::Skip(reason) => Some(*reason),
        }
    }
}

/// Decoder errors. Only transport faults surface; everything else is a skip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The node could not answer.
    #[error("Node RPC failed while decoding {tx_hash}: {source}")]
    Transport {
        /// Transaction being decoded.
        tx_hash: String,
        /// Underlying failure.
        #[source]
        source: TransportError,
    },
}

impl DecodeError {
    /// The underlying transport failure.
    pub fn transport(&self) -> &TransportError {
        match self {
            DecodeError::Transport { source, .. } => source,
        }
    }
}
