//! # Reconciliation Flows
//!
//! Decoder and post graph together, fed through the batch pipeline:
//!
//! 1. **Late parent**: replies seen before their parent wait in an orphan
//!    tree and are promoted, grandchildren included, when the parent lands.
//! 2. **Stale reply**: a reply not newer than its known parent is dropped.
//! 3. **Reply encodings**: the pre-v3 and post-v3 reply fields resolve to the
//!    same parent.
//! 4. **Both directions**: forward and backward orphans of one parent merge
//!    in chronological order.

#[cfg(test)]
mod tests {
    use sf_01_event_decoder::{Decoded, PostDecoder, SkipReason};
    use sf_03_post_graph::domain::check_all;
    use sf_03_post_graph::PostGraphApi;
    use shared_types::{PendingTx, PostLookup, PostTxSpec, ScanDirection};

    use crate::integration::Harness;

    // =========================================================================
    // LATE PARENT CASCADE
    // =========================================================================

    #[tokio::test]
    async fn test_late_parent_promotes_reply_and_grandchild() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 11, 2_090, &v2, 1, "parent"));
        h.node
            .add_post(&PostTxSpec::new("0x02", 12, 2_110, &v2, 2, "reply").replying_to(1));
        h.node
            .add_post(&PostTxSpec::new("0x03", 13, 2_120, &v2, 3, "grandchild").replying_to(2));

        let early = h
            .merge(&["0x02", "0x03"], &v2, ScanDirection::Forward)
            .await;
        assert_eq!(early.inserted, vec!["2".to_string(), "3".to_string()]);
        assert!(h.graph.post("2").unwrap().orphaned);
        assert!(h.graph.post("3").unwrap().orphaned);
        h.graph.read(|s| {
            assert_eq!(s.orphan_tree(ScanDirection::Forward).children("1"), vec!["2"]);
            assert_eq!(s.orphan_tree(ScanDirection::Forward).children("2"), vec!["3"]);
            assert!(s.reply_tree().children("1").is_empty());
        });

        let mut late = h.merge(&["0x01"], &v2, ScanDirection::Forward).await;
        assert_eq!(late.inserted, vec!["1".to_string()]);
        late.deorphaned.sort();
        assert_eq!(late.deorphaned, vec!["2".to_string(), "3".to_string()]);

        h.graph.read(|s| {
            assert_eq!(s.reply_tree().children("1"), vec!["2"]);
            assert_eq!(s.reply_tree().children("2"), vec!["3"]);
            assert!(s.orphan_tree(ScanDirection::Forward).children("1").is_empty());
            assert_eq!(
                s.orphan_tree(ScanDirection::Forward).slots("1").to_vec(),
                vec![None::<String>]
            );
            assert!(check_all(s));
        });
        assert!(!h.graph.post("2").unwrap().orphaned);
        assert!(!h.graph.post("3").unwrap().orphaned);

        let children = h.graph.children_of("1");
        assert_eq!(children.len(), 1);
        assert!(children[0].deorphaned);
    }

    #[tokio::test]
    async fn test_reprocessing_a_batch_changes_nothing() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 11, 2_100, &v2, 1, "root"));
        h.node
            .add_post(&PostTxSpec::new("0x02", 11, 2_110, &v2, 2, "reply").replying_to(1));

        h.merge(&["0x01", "0x02"], &v2, ScanDirection::Backward)
            .await;
        let before = h.graph.snapshot();

        let again = h
            .merge(&["0x01", "0x02"], &v2, ScanDirection::Backward)
            .await;
        assert!(again.inserted.is_empty());
        assert_eq!(again.skipped, 2);
        assert_eq!(h.graph.snapshot(), before);
    }

    // =========================================================================
    // STALE REPLY
    // =========================================================================

    #[tokio::test]
    async fn test_reply_older_than_parent_is_dropped() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 20, 2_095, &v2, 1, "parent"));
        h.node
            .add_post(&PostTxSpec::new("0x02", 19, 2_080, &v2, 2, "too early").replying_to(1));

        h.merge(&["0x01"], &v2, ScanDirection::Backward).await;

        let decoded = h
            .decoder
            .decode(&PendingTx::new("0x02"), &v2, &*h.graph)
            .await
            .unwrap();
        assert_eq!(decoded.skip_reason(), Some(SkipReason::StaleReply));

        let report = h.merge(&["0x02"], &v2, ScanDirection::Backward).await;
        assert!(report.inserted.is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(h.graph.post_count(), 1);
        assert!(h.graph.post_timestamp("2").is_none());
        h.graph.read(|s| {
            assert!(s.reply_tree().children("1").is_empty());
            assert!(s.orphan_tree(ScanDirection::Backward).children("1").is_empty());
        });
    }

    #[tokio::test]
    async fn test_reply_with_equal_timestamp_is_dropped() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 20, 2_095, &v2, 1, "parent"));
        h.node
            .add_post(&PostTxSpec::new("0x02", 20, 2_095, &v2, 2, "same second").replying_to(1));

        let report = h
            .merge(&["0x01", "0x02"], &v2, ScanDirection::Forward)
            .await;
        assert_eq!(report.inserted, vec!["1".to_string()]);
        assert_eq!(report.skipped, 1);
    }

    // =========================================================================
    // REPLY FIELD ENCODINGS
    // =========================================================================

    #[tokio::test]
    async fn test_pre_v3_and_v3_reply_fields_name_the_same_parent() {
        let h = Harness::new();
        let v1 = h.params.contract_v1.clone();
        let prefix = h.params.legacy_id_prefix.clone();
        assert!(900 < h.params.v3_timestamp);
        assert!(1_500 >= h.params.v3_timestamp && 1_500 < h.params.v5_timestamp);

        h.node.add_post(&PostTxSpec::new("0x07", 5, 800, &v1, 7, "legacy root"));
        h.node.add_post(
            &PostTxSpec::new("0x08", 6, 900, &v1, 8, "decimal in hex").replying_to_legacy(7),
        );
        h.node
            .add_post(&PostTxSpec::new("0x09", 7, 1_500, &v1, 9, "raw hex").replying_to(7));

        let mut targets = Vec::new();
        for hash in ["0x08", "0x09"] {
            let decoded = h
                .decoder
                .decode(&PendingTx::new(hash), &v1, &*h.graph)
                .await
                .unwrap();
            let Decoded::Candidate(candidate) = decoded else {
                panic!("{hash} should decode");
            };
            targets.push(candidate.post.reply_to_post_id.clone());
        }
        assert_eq!(targets[0], targets[1]);
        assert_eq!(targets[0], format!("{prefix}7"));

        h.merge(&["0x07", "0x08", "0x09"], &v1, ScanDirection::Forward)
            .await;
        h.graph.read(|s| {
            assert_eq!(
                s.reply_tree().children(&format!("{prefix}7")),
                vec![format!("{prefix}8"), format!("{prefix}9")]
            );
        });
    }

    // =========================================================================
    // BOTH DIRECTIONS
    // =========================================================================

    #[tokio::test]
    async fn test_forward_and_backward_orphans_merge_chronologically() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        h.node.add_post(&PostTxSpec::new("0x01", 10, 2_010, &v2, 1, "parent"));
        for (hash, id, ts) in [("0x02", 2, 2_020), ("0x03", 3, 2_030)] {
            h.node
                .add_post(&PostTxSpec::new(hash, 11, ts, &v2, id, "old").replying_to(1));
        }
        for (hash, id, ts) in [("0x04", 4, 2_040), ("0x05", 5, 2_050)] {
            h.node
                .add_post(&PostTxSpec::new(hash, 12, ts, &v2, id, "new").replying_to(1));
        }

        // Forward sees newest first, backward sees oldest first.
        h.merge(&["0x05"], &v2, ScanDirection::Forward).await;
        h.merge(&["0x04"], &v2, ScanDirection::Forward).await;
        h.merge(&["0x02", "0x03"], &v2, ScanDirection::Backward)
            .await;
        h.merge(&["0x01"], &v2, ScanDirection::Backward).await;

        h.graph.read(|s| {
            assert_eq!(s.reply_tree().children("1"), vec!["4", "5", "2", "3"]);
            assert!(check_all(s));
        });
    }

    #[tokio::test]
    async fn test_comment_on_unknown_post_waits_for_it() {
        let h = Harness::new();
        let v2 = h.params.contract_v2.clone();
        let channel = h.params.discussion_channel_of("1");
        h.node.add_post(&PostTxSpec::new("0x01", 10, 2_010, &v2, 1, "root"));
        h.node.add_post(
            &PostTxSpec::new("0x02", 11, 2_020, &v2, 2, "comment").on_channel(channel.clone()),
        );

        h.merge(&["0x02"], &v2, ScanDirection::Forward).await;
        h.graph.read(|s| {
            assert!(s.channel(&channel).unwrap().orphaned);
            assert_eq!(s.orphan_tree(ScanDirection::Forward).children(&channel), vec!["2"]);
        });

        h.merge(&["0x01"], &v2, ScanDirection::Backward).await;
        h.graph.read(|s| {
            assert!(!s.channel(&channel).unwrap().orphaned);
            assert_eq!(s.reply_tree().children(&channel), vec!["2"]);
        });
        assert_eq!(h.graph.ordered_root_ids(), vec!["1".to_string()]);
    }
}
