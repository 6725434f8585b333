//! # Feed Telemetry
//!
//! Logging and metrics for the social feed engine.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, JSON in
//!   containers and human-readable in development
//! - **Metrics**: Prometheus counters and gauges in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feed_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Scan drivers now emit logs and metrics
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SF_SERVICE_NAME` | `social-feed` | Service name in logs |
//! | `SF_LOG_LEVEL` | `info` | Log level filter |
//! | `SF_JSON_LOGS` | `false` | JSON output |
//! | `SF_CONSOLE_OUTPUT` | `true` | Console output |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, HistogramTimer, DECODER_SKIPPED, GRAPH_DEORPHANED,
    GRAPH_ORPHANS, GRAPH_POSTS, SCAN_BATCHES, SCAN_BATCH_DURATION, SCAN_BLOCKS_SCANNED,
    SCAN_WATERMARK, TRANSPORT_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register all metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_inc_macro() {
        let before = SCAN_BATCHES.with_label_values(&["forward", "rpc"]).get();
        metric_inc!(SCAN_BATCHES, &["forward", "rpc"]);
        assert_eq!(
            SCAN_BATCHES.with_label_values(&["forward", "rpc"]).get(),
            before + 1
        );
    }
}
