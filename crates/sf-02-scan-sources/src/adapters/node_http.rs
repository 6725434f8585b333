//! # Node JSON-RPC Client
//!
//! `NodeRpc` over HTTP. The node expects the API key inside the request
//! body next to `method`, `params` and `id`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use shared_types::{BlockInfo, NodeRpc, Poster, SyncStatus, TransportError, TxMeta, TxReceipt};

use super::retry::RetryPolicy;
use crate::config::NodeConfig;

const TRANSPORT: &str = "node";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    method: &'a str,
    params: &'a [Value],
    id: u64,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    #[serde(default = "Option::default")]
    result: Option<R>,
    #[serde(default)]
    error: Option<Value>,
}

/// Classify a reqwest failure.
pub(crate) fn map_reqwest_error(err: reqwest::Error, endpoint: &str) -> TransportError {
    if let Some(status) = err.status() {
        TransportError::Http {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Parse(err.to_string())
    } else {
        TransportError::Unavailable(format!("Cannot reach {endpoint}: {err}"))
    }
}

/// Node RPC client.
pub struct HttpNodeRpc {
    client: Client,
    url: String,
    api_key: String,
    retry: RetryPolicy,
    request_id: AtomicU64,
}

impl HttpNodeRpc {
    /// Create a client.
    pub fn new(config: &NodeConfig) -> Result<Self, TransportError> {
        let retry = RetryPolicy {
            call_timeout: config.timeout(),
            max_retries: config.max_retries,
            min_delay: config.min_retry_delay(),
        };
        let client = Client::builder()
            .timeout(retry.attempt_timeout())
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            retry,
            request_id: AtomicU64::new(1),
        })
    }

    /// Node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call_once<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<Option<R>, TransportError> {
        let request = JsonRpcRequest {
            method,
            params,
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            key: &self.api_key,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &self.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                endpoint: self.url.clone(),
            });
        }

        let body: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(TransportError::Rpc(error.to_string()));
        }
        Ok(body.result)
    }

    /// Call `method`, retrying transport faults. `Ok(None)` when the node
    /// answered with a null result.
    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Option<R>, TransportError> {
        trace!(method, "[sf-02] Node RPC call");
        self.retry
            .run(TRANSPORT, || self.call_once::<R>(method, &params))
            .await
    }
}

#[async_trait]
impl NodeRpc for HttpNodeRpc {
    async fn fetch_block_at(&self, height: u64) -> Result<Option<BlockInfo>, TransportError> {
        self.call("bcn_blockAt", vec![Value::from(height)]).await
    }

    async fn fetch_block_by_hash(&self, hash: &str) -> Result<Option<BlockInfo>, TransportError> {
        self.call("bcn_block", vec![Value::from(hash)]).await
    }

    async fn fetch_tx_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, TransportError> {
        self.call("bcn_txReceipt", vec![Value::from(tx_hash)]).await
    }

    async fn fetch_tx_meta(&self, tx_hash: &str) -> Result<Option<TxMeta>, TransportError> {
        self.call("bcn_transaction", vec![Value::from(tx_hash)]).await
    }

    async fn fetch_identity(&self, address: &str) -> Result<Option<Poster>, TransportError> {
        self.call("dna_identity", vec![Value::from(address)]).await
    }

    async fn sync_status(&self) -> Result<Option<SyncStatus>, TransportError> {
        self.call("bcn_syncing", Vec::new()).await
    }

    async fn last_block(&self) -> Result<Option<BlockInfo>, TransportError> {
        self.call("bcn_lastBlock", Vec::new()).await
    }
}
