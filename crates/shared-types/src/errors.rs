//! # Error Types
//!
//! Defines the transport error shared by every outbound port.

use thiserror::Error;

/// Errors raised by the node RPC and indexer API collaborators.
///
/// Every variant means "the upstream could not answer"; data-level
/// absences (no block, no receipt) are `Ok(None)` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint unreachable (connection refused, DNS failure).
    #[error("Endpoint unavailable: {0}")]
    Unavailable(String),

    /// Non-success HTTP status.
    #[error("HTTP status {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    /// The endpoint answered with an RPC error object.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The call did not complete within its deadline.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

impl TransportError {
    /// Whether a bounded retry may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Unavailable(_) | TransportError::Timeout(_) => true,
            TransportError::Http { status, .. } => *status >= 500 || *status == 429,
            TransportError::Rpc(_) | TransportError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Unavailable("refused".into()).is_retryable());
        assert!(TransportError::Timeout(5000).is_retryable());
        assert!(TransportError::Http {
            status: 503,
            endpoint: "node".into()
        }
        .is_retryable());
        assert!(!TransportError::Http {
            status: 404,
            endpoint: "node".into()
        }
        .is_retryable());
        assert!(!TransportError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Http {
            status: 502,
            endpoint: "https://api.example".into(),
        };
        assert!(err.to_string().contains("502"));
    }
}
