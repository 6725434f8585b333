//! # Domain Layer - Scan Sources
//!
//! - `batch`: `ScanBatch`, `BlockScan`, `IndexerScan`
//! - `cursor`: `BackwardCursor`, `Continuation`, `PageStep`
//! - `errors`: `SourceError`

pub mod batch;
pub mod cursor;
pub mod errors;

pub use batch::*;
pub use cursor::*;
pub use errors::*;
