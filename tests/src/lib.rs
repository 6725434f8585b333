//! # Social Feed Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks of the post graph merge
//! └── src/integration/  # Cross-subsystem flows over the mock node and indexer
//!     ├── reconciliation.rs   # decoder + graph: cascades, stale replies, encodings
//!     ├── history.rs          # backward sources: pagination, contract fallback, switching
//!     └── controller_flow.rs  # both drivers running against one graph
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sf-tests
//!
//! # By category
//! cargo test -p sf-tests integration::history::
//!
//! # Benchmarks
//! cargo bench -p sf-tests
//! ```

#![allow(dead_code)]

pub mod integration;
