//! # Application Module
//!
//! The two scan sources a driver can pull from.

pub mod block_walk;
pub mod indexer;

pub use block_walk::BlockWalkSource;
pub use indexer::IndexerSource;
