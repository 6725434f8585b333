//! Prometheus metrics for the feed subsystems.
//!
//! All metrics follow the naming convention: `sf_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., blocks_scanned_total)
//! - **Gauge**: Value that can go up or down (e.g., scan_watermark)

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SCAN METRICS (Subsystems 2, 4)
    // =========================================================================

    /// Blocks (or indexer pages) consumed per direction
    pub static ref SCAN_BLOCKS_SCANNED: IntCounterVec = IntCounterVec::new(
        Opts::new("sf_scan_blocks_scanned_total", "Blocks or pages consumed by the scan drivers"),
        &["direction"]  // direction: forward/backward
    ).expect("metric creation failed");

    /// Non-empty batches handed to the decoder
    pub static ref SCAN_BATCHES: IntCounterVec = IntCounterVec::new(
        Opts::new("sf_scan_batches_total", "Transaction batches processed"),
        &["direction", "source"]  // source: rpc/indexer
    ).expect("metric creation failed");

    /// Last committed watermark per direction
    pub static ref SCAN_WATERMARK: IntGaugeVec = IntGaugeVec::new(
        Opts::new("sf_scan_watermark", "Last committed block height"),
        &["direction"]
    ).expect("metric creation failed");

    /// Batch processing duration
    pub static ref SCAN_BATCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sf_scan_batch_duration_seconds",
            "Time spent decoding and merging one batch"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0])
    ).expect("metric creation failed");

    // =========================================================================
    // DECODER METRICS (Subsystem 1)
    // =========================================================================

    /// Transactions that did not yield a post
    pub static ref DECODER_SKIPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("sf_decoder_transactions_skipped_total", "Transactions skipped by the decoder"),
        &["reason"]
    ).expect("metric creation failed");

    // =========================================================================
    // GRAPH METRICS (Subsystem 3)
    // =========================================================================

    /// Posts inserted into the graph
    pub static ref GRAPH_POSTS: IntCounter = IntCounter::new(
        "sf_graph_posts_total",
        "Posts inserted into the post graph"
    ).expect("metric creation failed");

    /// Posts placed into an orphan tree
    pub static ref GRAPH_ORPHANS: IntCounterVec = IntCounterVec::new(
        Opts::new("sf_graph_orphans_total", "Posts parked in an orphan tree"),
        &["direction"]
    ).expect("metric creation failed");

    /// Posts moved from an orphan tree into the reply tree
    pub static ref GRAPH_DEORPHANED: IntCounter = IntCounter::new(
        "sf_graph_deorphaned_total",
        "Posts reattached by the de-orphan cascade"
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSPORT METRICS
    // =========================================================================

    /// Failed calls per upstream
    pub static ref TRANSPORT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("sf_transport_failures_total", "Failed upstream calls"),
        &["transport"]  // transport: node/indexer
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Scan
        Box::new(SCAN_BLOCKS_SCANNED.clone()),
        Box::new(SCAN_BATCHES.clone()),
        Box::new(SCAN_WATERMARK.clone()),
        Box::new(SCAN_BATCH_DURATION.clone()),
        // Decoder
        Box::new(DECODER_SKIPPED.clone()),
        // Graph
        Box::new(GRAPH_POSTS.clone()),
        Box::new(GRAPH_ORPHANS.clone()),
        Box::new(GRAPH_DEORPHANED.clone()),
        // Transport
        Box::new(TRANSPORT_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    register_metrics()?;
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
