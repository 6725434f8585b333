//! # SF-04 Scan Controller
//!
//! Runs the forward driver (new blocks, forever) and the backward driver
//! (history, in bursts bounded by a time budget) over the scan sources,
//! feeding both through the decoder into the shared post graph.
//!
//! **Subsystem ID:** 4
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A watermark moves only after its batch is fully merged | `application/forward.rs`, `application/backward.rs` - commit after `process()` |
//! | Transactions of a batch merge in arrival order | `application/pipeline.rs` |
//! | History never goes below the first relevant block | `application/backward.rs` - `reached_floor()` |
//! | Switching history source keeps the backward watermark | `sf-02` `BackwardCursor` shared by both sources |
//! | Transport faults pause, never skip | `application/controller.rs` - `run_backward()` |
//!
//! ## Module Structure
//!
//! ```text
//! sf-04-scan-controller/
//! ├── config.rs        # ScanConfig
//! ├── domain/          # cursors, step outcomes, status, errors
//! ├── ports/           # ScanControlApi (inbound)
//! └── application/     # pipeline, drivers, ScanController
//! ```

#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{BackwardDriver, BatchPipeline, ForwardDriver, ScanController};
pub use config::ScanConfig;
pub use domain::{
    BatchReport, ControllerError, ForwardCursor, ScanStatus, StepError, StepOutcome,
};
pub use ports::ScanControlApi;
