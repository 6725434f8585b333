//! # Application Module
//!
//! - `pipeline`: decode-then-merge of one batch
//! - `forward` / `backward`: single-step drivers over the scan sources
//! - `controller`: task lifecycle, bursts, status and events

pub mod backward;
pub mod controller;
pub mod forward;
pub mod pipeline;

pub use backward::BackwardDriver;
pub use controller::ScanController;
pub use forward::ForwardDriver;
pub use pipeline::BatchPipeline;
