//! # Controller Flows
//!
//! Both drivers running as tasks against one graph. Arrival order across
//! the drivers is not deterministic; the assertions only inspect the fixed
//! point the graph settles on.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use sf_03_post_graph::domain::check_all;
    use sf_03_post_graph::PostGraphStore;
    use sf_04_scan_controller::{ScanConfig, ScanControlApi, ScanController};
    use shared_bus::{EventFilter, EventTopic, FeedEvent, HistorySource, InMemoryEventBus};
    use shared_types::{ChainParams, MockIndexerApi, MockNodeRpc, PostTxSpec};

    type Controller = ScanController<MockNodeRpc, MockIndexerApi>;

    struct Setup {
        params: ChainParams,
        node: Arc<MockNodeRpc>,
        indexer: Arc<MockIndexerApi>,
        controller: Controller,
    }

    fn setup(config: ScanConfig) -> Setup {
        let params = ChainParams::for_testing();
        let node = Arc::new(MockNodeRpc::new());
        let indexer = Arc::new(MockIndexerApi::new());
        let controller = ScanController::new(
            node.clone(),
            indexer.clone(),
            Arc::new(PostGraphStore::new(&params)),
            Arc::new(InMemoryEventBus::new()),
            params.clone(),
            config,
            10,
        );
        Setup {
            params,
            node,
            indexer,
            controller,
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..400 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_reply_and_parent_meet_across_drivers() {
        let s = setup(ScanConfig::for_testing());
        let v2 = s.params.contract_v2.clone();
        let channel = s.params.discussion_channel_of("1");

        s.node.add_empty_block(10, 2_000);
        s.node.add_post(&PostTxSpec::new("0x01", 15, 2_150, &v2, 1, "parent"));
        for height in [11, 12, 13, 14, 16, 17, 18, 19, 20] {
            s.node.add_empty_block(height, 2_000 + height * 10);
        }

        s.controller.initialize().await.unwrap();
        s.controller.start().await.unwrap();

        s.node
            .add_post(&PostTxSpec::new("0x02", 21, 2_210, &v2, 2, "reply").replying_to(1));
        s.node.add_post(
            &PostTxSpec::new("0x03", 22, 2_220, &v2, 3, "comment").on_channel(channel.clone()),
        );
        s.node
            .add_post(&PostTxSpec::new("0x04", 23, 2_230, &v2, 4, "nested").replying_to(2));

        assert!(s.controller.scan_history().await);
        wait_for(|| s.controller.status().no_more_past_blocks).await;
        wait_for(|| s.controller.status().forward_watermark == Some(23)).await;
        s.controller.shutdown().await;

        let graph = s.controller.graph();
        assert_eq!(graph.post_count(), 4);
        graph.read(|state| {
            assert_eq!(state.reply_tree().children("1"), vec!["2"]);
            assert_eq!(state.reply_tree().children("2"), vec!["4"]);
            assert_eq!(state.reply_tree().children(&channel), vec!["3"]);
            assert!(check_all(state));
        });
        for id in ["2", "3", "4"] {
            assert!(!graph.post(id).unwrap().orphaned, "{id} still orphaned");
        }
        assert_eq!(graph.ordered_root_ids(), vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_indexer_history_then_exhaustion() {
        let config = ScanConfig {
            history_source: HistorySource::Indexer,
            ..ScanConfig::for_testing()
        };
        let s = setup(config);
        let v2 = s.params.contract_v2.clone();
        s.node.add_empty_block(50, 2_500);
        s.node.add_post(&PostTxSpec::new("0x01", 30, 2_300, &v2, 1, "first"));
        s.node.add_post(&PostTxSpec::new("0x02", 40, 2_400, &v2, 2, "second"));
        s.indexer.push_page(
            &v2,
            vec![
                MockIndexerApi::post_update("0x02", "1970-01-01T00:40:00Z"),
                MockIndexerApi::post_update("0x01", "1970-01-01T00:38:20Z"),
            ],
        );

        let mut events = s
            .controller
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Scan]));

        s.controller.initialize().await.unwrap();
        assert!(!s.controller.status().indexer_invalid);
        s.controller.start().await.unwrap();
        s.controller.scan_history().await;

        wait_for(|| s.controller.status().no_more_past_blocks).await;
        assert_eq!(s.controller.status().backward_watermark, Some(30));
        assert_eq!(
            s.controller.graph().ordered_root_ids(),
            vec!["2".to_string(), "1".to_string()]
        );
        assert!(!s.controller.scan_history().await);
        s.controller.shutdown().await;

        let mut finished = 0;
        while let Ok(Some(event)) = events.try_recv() {
            if event == FeedEvent::HistoryFinished {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn test_indexer_outage_flags_and_rpc_switch_recovers() {
        let config = ScanConfig {
            history_source: HistorySource::Indexer,
            ..ScanConfig::for_testing()
        };
        let s = setup(config);
        let v2 = s.params.contract_v2.clone();
        s.node.add_empty_block(13, 2_130);
        s.node.add_post(&PostTxSpec::new("0x01", 12, 2_120, &v2, 1, "walked"));
        s.node.add_empty_block(11, 2_110);
        s.node.add_empty_block(10, 2_100);
        s.indexer.push_page(
            &v2,
            vec![MockIndexerApi::post_update("0x01", "1970-01-01T00:35:20Z")],
        );

        s.controller.initialize().await.unwrap();
        s.indexer.set_unavailable(true);
        s.controller.start().await.unwrap();
        s.controller.scan_history().await;

        wait_for(|| s.controller.status().indexer_invalid).await;
        assert_eq!(s.controller.status().backward_watermark, None);

        s.controller.set_history_source(HistorySource::Rpc).await;
        assert!(s.controller.scan_history().await);
        assert!(!s.controller.status().indexer_invalid);

        wait_for(|| s.controller.status().no_more_past_blocks).await;
        assert_eq!(s.controller.status().backward_watermark, Some(10));
        assert!(s.controller.graph().post("1").is_some());
        s.controller.shutdown().await;
    }
}
