//! # Inbound Ports
//!
//! API trait defining what the scan controller offers its host.

use async_trait::async_trait;
use shared_bus::HistorySource;

use crate::domain::{ControllerError, ScanStatus};

/// Scan Controller API - inbound port.
#[async_trait]
pub trait ScanControlApi: Send + Sync {
    /// Probe the node and fix the initial block. Returns the initial block.
    async fn initialize(&self) -> Result<u64, ControllerError>;

    /// Spawn the forward and backward drivers.
    async fn start(&self) -> Result<(), ControllerError>;

    /// Request a backward burst. `false` when history is exhausted.
    async fn scan_history(&self) -> bool;

    /// Switch the backward source; takes effect at the next step.
    async fn set_history_source(&self, source: HistorySource);

    /// Current status flags and watermarks.
    fn status(&self) -> ScanStatus;

    /// Stop both drivers after their in-flight step.
    async fn shutdown(&self);
}
