//! # Batch Pipeline
//!
//! Decodes and merges the transactions of one batch strictly in arrival
//! order. Each candidate is merged before the next transaction is decoded,
//! so later transactions of the batch see earlier ones (known posters,
//! known parents).

use std::sync::Arc;

use tracing::debug;

use sf_01_event_decoder::{DecodeError, Decoded, PostDecoder, SkipReason};
use sf_02_scan_sources::ScanBatch;
use sf_03_post_graph::{PostGraphApi, PostGraphStore};
use shared_types::ScanDirection;

use crate::domain::BatchReport;

/// Decoder plus graph, shared by both drivers.
#[derive(Clone)]
pub struct BatchPipeline {
    decoder: Arc<dyn PostDecoder>,
    graph: Arc<PostGraphStore>,
}

impl BatchPipeline {
    /// Create a pipeline.
    pub fn new(decoder: Arc<dyn PostDecoder>, graph: Arc<PostGraphStore>) -> Self {
        Self { decoder, graph }
    }

    /// The graph this pipeline merges into.
    pub fn graph(&self) -> &Arc<PostGraphStore> {
        &self.graph
    }

    /// Process `batch`. A transport fault aborts the batch; candidates
    /// merged before it stay merged and are skipped as known on retry.
    pub async fn process(
        &self,
        batch: &ScanBatch,
        direction: ScanDirection,
    ) -> Result<BatchReport, DecodeError> {
        let mut cursor = self.graph.begin_batch(direction);
        let mut report = BatchReport::default();

        for tx in &batch.transactions {
            match self
                .decoder
                .decode(tx, &batch.contract, &*self.graph)
                .await?
            {
                Decoded::Candidate(candidate) => {
                    let outcome = self.graph.submit(&mut cursor, &candidate);
                    if outcome.inserted {
                        report.inserted.push(candidate.post.post_id.clone());
                    }
                    report.deorphaned.extend(outcome.deorphaned);
                    report.last_valid = Some(tx.clone());
                }
                Decoded::Skip(SkipReason::AlreadyKnown) => {
                    report.skipped += 1;
                    report.last_valid = Some(tx.clone());
                }
                Decoded::Skip(_) => report.skipped += 1,
            }
        }

        debug!(
            %direction,
            transactions = batch.len(),
            inserted = report.inserted.len(),
            deorphaned = report.deorphaned.len(),
            skipped = report.skipped,
            "[sf-04] Batch processed"
        );
        Ok(report)
    }
}
