//! # History Flows
//!
//! The backward driver over both history sources:
//!
//! 1. **Contract fallback**: an indexer page without a continuation token on
//!    the current contract moves paging to the legacy contract from its
//!    first page.
//! 2. **Source switch**: the block walk resumes from the height the indexer
//!    reached, and the indexer resumes from the block walk's watermark.
//! 3. **Floor**: the block walk never scans below the first relevant block.

#[cfg(test)]
mod tests {
    use shared_bus::HistorySource;
    use shared_types::{MockIndexerApi, PostTxSpec};
    use sf_04_scan_controller::{StepError, StepOutcome};

    use crate::integration::Harness;

    #[tokio::test]
    async fn test_indexer_falls_back_to_legacy_contract_with_fresh_token() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        let v1 = h.params.contract_v1.clone();
        h.node.add_post(&PostTxSpec::new("0x02", 60, 2_600, &v2, 2, "newer"));
        h.node.add_post(&PostTxSpec::new("0x01", 50, 2_500, &v2, 1, "older"));
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x02", "1970-01-01T00:43:20Z")],
        );
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x01", "1970-01-01T00:41:40Z")],
        );

        let mut driver = h.backward_driver(100, HistorySource::Indexer);

        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 60, .. }
        ));
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 50, .. }
        ));
        assert_eq!(driver.cursor().active_contract, v1);

        // Legacy contract has nothing indexed.
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Paged { .. }
        ));
        assert_eq!(driver.step().await.unwrap(), StepOutcome::Finished);

        let requests = h.indexer.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], (v2.clone(), None));
        assert_eq!(requests[1].0, v2);
        assert!(requests[1].1.is_some());
        assert_eq!(requests[2], (v1, None));

        assert_eq!(h.graph.ordered_root_ids(), vec!["2".to_string(), "1".to_string()]);
    }

    #[tokio::test]
    async fn test_block_walk_resumes_where_indexer_stopped() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x02", 55, 2_550, &v2, 2, "indexed"));
        h.node.add_post(&PostTxSpec::new("0x01", 54, 2_540, &v2, 1, "walked"));
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x02", "1970-01-01T00:42:30Z")],
        );
        h.indexer.push_page(&v2, Vec::new());

        let mut driver = h.backward_driver(100, HistorySource::Indexer);
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 55, .. }
        ));

        driver.set_history_source(HistorySource::Rpc);

        // The indexed block is walked again; its post is already known.
        let StepOutcome::Advanced { height, report } = driver.step().await.unwrap() else {
            panic!("expected block 55");
        };
        assert_eq!(height, 55);
        assert!(report.inserted.is_empty());
        assert_eq!(report.skipped, 1);

        let StepOutcome::Advanced { height, report } = driver.step().await.unwrap() else {
            panic!("expected block 54");
        };
        assert_eq!(height, 54);
        assert_eq!(report.inserted, vec!["1".to_string()]);
        assert_eq!(h.graph.post_count(), 2);
    }

    #[tokio::test]
    async fn test_indexer_resumes_after_block_walk() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_empty_block(99, 2_990);
        h.node.add_post(&PostTxSpec::new("0x01", 40, 2_400, &v2, 1, "indexed"));
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x01", "1970-01-01T00:40:00Z")],
        );

        let mut driver = h.backward_driver(100, HistorySource::Rpc);
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 99, .. }
        ));
        assert_eq!(driver.cursor().watermark(), Some(99));

        driver.set_history_source(HistorySource::Indexer);
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 40, .. }
        ));
        assert_eq!(driver.cursor().watermark(), Some(40));
    }

    #[tokio::test]
    async fn test_indexer_restart_never_raises_block_walk_watermark() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 99, 2_990, &v2, 1, "known"));
        for height in 94..99 {
            h.node.add_empty_block(height, 2_000 + height * 10);
        }
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x01", "1970-01-01T00:49:50Z")],
        );

        let mut driver = h.backward_driver(100, HistorySource::Rpc);
        for _ in 0..5 {
            driver.step().await.unwrap();
        }
        assert_eq!(driver.cursor().watermark(), Some(95));

        // The indexer starts over from its first page and serves block 99.
        driver.set_history_source(HistorySource::Indexer);
        let StepOutcome::Advanced { height, report } = driver.step().await.unwrap() else {
            panic!("expected the known post");
        };
        assert_eq!(height, 95);
        assert!(report.inserted.is_empty());
        assert_eq!(driver.cursor().watermark(), Some(95));

        driver.set_history_source(HistorySource::Rpc);
        assert!(matches!(
            driver.step().await.unwrap(),
            StepOutcome::Advanced { height: 94, .. }
        ));
        assert_eq!(driver.cursor().watermark(), Some(94));
        assert_eq!(h.graph.post_count(), 1);
    }

    #[tokio::test]
    async fn test_block_walk_stops_at_first_relevant_block() {
        let h = Harness::new();
        let floor = h.params.first_block;
        for height in floor..floor + 3 {
            h.node.add_empty_block(height, 2_100 + height);
        }

        let mut driver = h.backward_driver(floor + 3, HistorySource::Rpc);
        let mut walked = Vec::new();
        loop {
            match driver.step().await.unwrap() {
                StepOutcome::Advanced { height, .. } => walked.push(height),
                StepOutcome::Finished => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(walked, vec![floor + 2, floor + 1, floor]);
        assert!(driver.reached_floor());
    }

    #[tokio::test]
    async fn test_offline_indexer_keeps_watermark() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 70, 2_700, &v2, 1, "a"));
        h.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x01", "1970-01-01T00:45:00Z")],
        );
        h.indexer.push_page(&v2, Vec::new());

        let mut driver = h.backward_driver(100, HistorySource::Indexer);
        driver.step().await.unwrap();
        assert_eq!(driver.cursor().watermark(), Some(70));

        h.indexer.set_unavailable(true);
        assert!(matches!(driver.step().await, Err(StepError::Indexer(_))));
        assert_eq!(driver.cursor().watermark(), Some(70));

        h.indexer.set_unavailable(false);
        assert!(driver.step().await.is_ok());
    }
}
