//! Configuration types for the scan drivers

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_bus::HistorySource;

/// Scan controller configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Where the backward driver reads history from
    pub history_source: HistorySource,

    /// Delay between forward driver cycles
    pub polling_interval_ms: u64,

    /// Delay between backward driver cycles within a burst
    pub scanning_interval_ms: u64,

    /// Wall-clock budget of one backward burst
    pub scan_budget_secs: u64,

    /// Starting height; the chain head when unset
    pub initial_block: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            history_source: HistorySource::Indexer,
            polling_interval_ms: 5_000,
            scanning_interval_ms: 10,
            scan_budget_secs: 60,
            initial_block: None,
        }
    }
}

impl ScanConfig {
    /// Create config for testing with short intervals.
    pub fn for_testing() -> Self {
        Self {
            history_source: HistorySource::Rpc,
            polling_interval_ms: 50,
            scanning_interval_ms: 1,
            scan_budget_secs: 5,
            initial_block: None,
        }
    }

    /// Forward polling delay.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// Backward cycle delay.
    pub fn scanning_interval(&self) -> Duration {
        Duration::from_millis(self.scanning_interval_ms)
    }

    /// Backward burst budget.
    pub fn scan_budget(&self) -> Duration {
        Duration::from_secs(self.scan_budget_secs)
    }
}
