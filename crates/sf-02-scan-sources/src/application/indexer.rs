//! # Indexer Source
//!
//! Pages through the balance updates of the posting contract, newest
//! first. When the current contract runs out of pages the source falls back
//! to the legacy contract with fresh pagination; when that runs out too the
//! history is finished.
//!
//! The indexer does not report block heights. They are resolved from the
//! transaction hash, and only for the item that becomes the watermark.

use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, info};

use shared_types::{BalanceUpdate, ChainParams, IndexerApi, NodeRpc, PendingTx};

use crate::domain::{BackwardCursor, Continuation, IndexerScan, PageStep, ScanBatch, SourceError};

const CALL_CONTRACT: &str = "CallContract";

/// Paginated history source.
pub struct IndexerSource<I: IndexerApi, R: NodeRpc> {
    api: Arc<I>,
    rpc: Arc<R>,
    params: ChainParams,
    page_limit: usize,
}

impl<I: IndexerApi, R: NodeRpc> IndexerSource<I, R> {
    /// Create an indexer source.
    pub fn new(api: Arc<I>, rpc: Arc<R>, params: ChainParams, page_limit: usize) -> Self {
        Self {
            api,
            rpc,
            params,
            page_limit: page_limit.max(1),
        }
    }

    /// Fetch the page `cursor` points at. The cursor is not advanced; the
    /// driver commits the returned step once the batch is processed.
    pub async fn next_page(&self, cursor: &BackwardCursor) -> Result<IndexerScan, SourceError> {
        if cursor.is_finished() {
            return Ok(IndexerScan::Finished);
        }

        let contract = cursor.active_contract.clone();
        let page = self
            .api
            .fetch_page(&contract, self.page_limit, cursor.continuation.token())
            .await
            .map_err(SourceError::IndexerUnavailable)?;

        let step = match page.continuation_token {
            Some(token) => PageStep {
                contract: contract.clone(),
                continuation: Continuation::Token(token),
            },
            None if contract.eq_ignore_ascii_case(&self.params.contract_v2) => {
                info!("[sf-02] Current contract exhausted, continuing with legacy contract");
                PageStep {
                    contract: self.params.contract_v1.clone(),
                    continuation: Continuation::Start,
                }
            }
            None => {
                info!("[sf-02] Legacy contract exhausted, history finished");
                PageStep {
                    contract: contract.clone(),
                    continuation: Continuation::Finished,
                }
            }
        };

        let transactions: Vec<PendingTx> = page
            .result
            .iter()
            .filter(|update| self.is_post_update(update))
            .map(|update| PendingTx {
                tx_hash: update.hash.clone(),
                timestamp: parse_timestamp(&update.timestamp),
                block_height: None,
            })
            .collect();

        debug!(
            items = page.result.len(),
            posts = transactions.len(),
            %contract,
            "[sf-02] Indexer page fetched"
        );

        Ok(IndexerScan::Page {
            batch: ScanBatch {
                transactions,
                contract,
                height: None,
            },
            step,
        })
    }

    /// Height of the block enclosing `tx_hash`.
    pub async fn resolve_block_height(&self, tx_hash: &str) -> Result<Option<u64>, SourceError> {
        let Some(meta) = self
            .rpc
            .fetch_tx_meta(tx_hash)
            .await
            .map_err(SourceError::RpcUnavailable)?
        else {
            return Ok(None);
        };
        let block = self
            .rpc
            .fetch_block_by_hash(&meta.block_hash)
            .await
            .map_err(SourceError::RpcUnavailable)?;
        Ok(block.map(|b| b.height))
    }

    /// Check the indexer serves the current posting contract.
    pub async fn validate(&self) -> Result<bool, SourceError> {
        self.api
            .probe(&self.params.contract_v2)
            .await
            .map_err(SourceError::IndexerUnavailable)
    }

    fn is_post_update(&self, update: &BalanceUpdate) -> bool {
        update.kind == CALL_CONTRACT
            && update
                .tx_receipt
                .as_ref()
                .is_some_and(|r| r.method == self.params.make_post_method && r.success)
    }
}

/// RFC 3339 timestamp to UNIX seconds.
fn parse_timestamp(raw: &str) -> Option<u64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .and_then(|ts| u64::try_from(ts.timestamp()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{MockIndexerApi, MockNodeRpc, PostTxSpec};

    type Source = IndexerSource<MockIndexerApi, MockNodeRpc>;

    fn setup() -> (Arc<MockIndexerApi>, Arc<MockNodeRpc>, Source, ChainParams) {
        let params = ChainParams::for_testing();
        let api = Arc::new(MockIndexerApi::new());
        let node = Arc::new(MockNodeRpc::new());
        let source = IndexerSource::new(api.clone(), node.clone(), params.clone(), 10);
        (api, node, source, params)
    }

    fn page(scan: IndexerScan) -> (ScanBatch, PageStep) {
        match scan {
            IndexerScan::Page { batch, step } => (batch, step),
            IndexerScan::Finished => panic!("expected a page"),
        }
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-01T00:16:40Z"), Some(1_000));
        assert_eq!(parse_timestamp("2025-01-01T00:00:00+00:00"), Some(1_735_689_600));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[tokio::test]
    async fn test_filters_non_post_updates() {
        let (api, _node, source, params) = setup();
        let mut transfer = MockIndexerApi::post_update("0x02", "1970-01-01T00:16:40Z");
        transfer.kind = "SendTx".to_string();
        let mut failed = MockIndexerApi::post_update("0x03", "1970-01-01T00:16:40Z");
        failed.tx_receipt.as_mut().unwrap().success = false;
        api.push_page(
            &params.contract_v2,
            vec![
                MockIndexerApi::post_update("0x01", "1970-01-01T00:16:40Z"),
                transfer,
                failed,
            ],
        );

        let (batch, _) = page(
            source
                .next_page(&BackwardCursor::new(&params.contract_v2))
                .await
                .unwrap(),
        );
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.transactions[0].tx_hash, "0x01");
        assert_eq!(batch.transactions[0].timestamp, Some(1_000));
    }

    #[tokio::test]
    async fn test_pagination_falls_back_to_legacy_then_finishes() {
        let (api, _node, source, params) = setup();
        api.push_page(&params.contract_v2, vec![MockIndexerApi::post_update("0xa1", "")]);
        api.push_page(&params.contract_v2, vec![MockIndexerApi::post_update("0xa2", "")]);
        api.push_page(&params.contract_v1, vec![MockIndexerApi::post_update("0xb1", "")]);

        let mut cursor = BackwardCursor::new(&params.contract_v2);

        let (_, step) = page(source.next_page(&cursor).await.unwrap());
        assert!(matches!(step.continuation, Continuation::Token(_)));
        cursor.commit_page(step, None);

        let (batch, step) = page(source.next_page(&cursor).await.unwrap());
        assert_eq!(batch.contract, params.contract_v2);
        assert_eq!(step.contract, params.contract_v1);
        assert_eq!(step.continuation, Continuation::Start);
        cursor.commit_page(step, None);

        let (batch, step) = page(source.next_page(&cursor).await.unwrap());
        assert_eq!(batch.contract, params.contract_v1);
        assert_eq!(step.continuation, Continuation::Finished);
        cursor.commit_page(step, None);

        assert_eq!(source.next_page(&cursor).await.unwrap(), IndexerScan::Finished);

        let requests = api.requests();
        assert_eq!(requests[2], (params.contract_v1.clone(), None));
    }

    #[tokio::test]
    async fn test_unavailable_indexer() {
        let (api, _node, source, params) = setup();
        api.set_unavailable(true);
        let err = source
            .next_page(&BackwardCursor::new(&params.contract_v2))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::IndexerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_resolve_block_height() {
        let (_api, node, source, params) = setup();
        node.add_post(&PostTxSpec::new("0x01", 44, 2_500, &params.contract_v2, 1, "a"));
        assert_eq!(source.resolve_block_height("0x01").await, Ok(Some(44)));
        assert_eq!(source.resolve_block_height("0xnone").await, Ok(None));
    }

    #[tokio::test]
    async fn test_validate_checks_address() {
        let (api, _node, source, params) = setup();
        assert!(!source.validate().await.unwrap());
        api.push_page(&params.contract_v2, vec![MockIndexerApi::post_update("0x01", "")]);
        assert!(source.validate().await.unwrap());
    }
}
