//! Configuration types for the node and indexer clients

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default public node endpoint.
pub const DEFAULT_NODE_URL: &str = "https://restricted.idena.io";

/// Key accepted by the default public node.
pub const DEFAULT_NODE_API_KEY: &str = "idena-restricted-node-key";

/// Default indexer endpoint.
pub const DEFAULT_INDEXER_URL: &str = "https://api.idena.io";

/// Items requested per indexer page.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Node JSON-RPC client configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node URL
    pub url: String,

    /// Node API key, sent in every request body
    pub api_key: String,

    /// Deadline per call, retries included
    pub timeout_ms: u64,

    /// Retries after the first attempt
    pub max_retries: usize,

    /// First backoff delay
    pub min_retry_delay_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NODE_URL.to_string(),
            api_key: DEFAULT_NODE_API_KEY.to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
            min_retry_delay_ms: 200,
        }
    }
}

impl NodeConfig {
    /// Create config for testing with short deadlines.
    pub fn for_testing() -> Self {
        Self {
            url: "http://127.0.0.1:9009".to_string(),
            api_key: "test-key".to_string(),
            timeout_ms: 500,
            max_retries: 1,
            min_retry_delay_ms: 10,
        }
    }

    /// Call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// First backoff delay.
    pub fn min_retry_delay(&self) -> Duration {
        Duration::from_millis(self.min_retry_delay_ms)
    }
}

/// Indexer API client configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Indexer base URL
    pub url: String,

    /// Items per page
    pub page_limit: usize,

    /// Deadline per call, retries included
    pub timeout_ms: u64,

    /// Retries after the first attempt
    pub max_retries: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_INDEXER_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout_ms: 10_000,
            max_retries: 3,
        }
    }
}

impl IndexerConfig {
    /// Create config for testing with short deadlines.
    pub fn for_testing() -> Self {
        Self {
            url: "http://127.0.0.1:9010".to_string(),
            page_limit: 2,
            timeout_ms: 500,
            max_retries: 1,
        }
    }

    /// Call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
