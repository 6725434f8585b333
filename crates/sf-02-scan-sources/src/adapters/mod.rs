//! # Adapters
//!
//! HTTP implementations of the outbound `NodeRpc` and `IndexerApi` ports.

pub mod indexer_http;
pub mod node_http;
pub mod retry;

pub use indexer_http::HttpIndexerApi;
pub use node_http::HttpNodeRpc;
pub use retry::RetryPolicy;
