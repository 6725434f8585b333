//! # SF-02 Scan Sources
//!
//! Produces batches of candidate transactions for the scan drivers.
//!
//! **Subsystem ID:** 2
//!
//! ## Sources
//!
//! | Source | Used by | Position |
//! |--------|---------|----------|
//! | `BlockWalkSource` | forward driver, backward driver on `rpc` history | absolute block height |
//! | `IndexerSource` | backward driver on `indexer` history | continuation token per contract |
//!
//! Both sources report progress as an absolute block height through
//! `BackwardCursor`, so the backward driver can switch between them without
//! losing its watermark.
//!
//! ## Module Structure
//!
//! ```text
//! sf-02-scan-sources/
//! ├── domain/          # ScanBatch, BlockScan, IndexerScan, BackwardCursor, SourceError
//! ├── adapters/        # HttpNodeRpc, HttpIndexerApi, RetryPolicy (backon)
//! ├── application/     # BlockWalkSource, IndexerSource
//! └── config.rs        # NodeConfig, IndexerConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

pub use adapters::{HttpIndexerApi, HttpNodeRpc, RetryPolicy};
pub use application::{BlockWalkSource, IndexerSource};
pub use config::{IndexerConfig, NodeConfig};
pub use domain::{
    BackwardCursor, BlockScan, Continuation, IndexerScan, PageStep, ScanBatch, SourceError,
};
