//! # Indexer API Client
//!
//! `IndexerApi` over the public indexer's `BalanceUpdates` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use shared_types::{IndexerApi, IndexerPage, TransportError};

use super::node_http::map_reqwest_error;
use super::retry::RetryPolicy;
use crate::config::IndexerConfig;

const TRANSPORT: &str = "indexer";

/// Indexer client.
pub struct HttpIndexerApi {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpIndexerApi {
    /// Create a client.
    pub fn new(config: &IndexerConfig) -> Result<Self, TransportError> {
        let retry = RetryPolicy {
            call_timeout: config.timeout(),
            max_retries: config.max_retries,
            min_delay: std::time::Duration::from_millis(200),
        };
        let client = Client::builder()
            .timeout(retry.attempt_timeout())
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Listing URL of `contract`.
    pub fn balance_updates_url(&self, contract: &str) -> String {
        format!(
            "{}/api/Address/{contract}/Contract/{contract}/BalanceUpdates",
            self.base_url
        )
    }

    async fn fetch_once(
        &self,
        url: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<IndexerPage, TransportError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(token) = continuation_token {
            query.push(("continuationToken", token.to_string()));
        }

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                endpoint: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))
    }
}

#[async_trait]
impl IndexerApi for HttpIndexerApi {
    async fn fetch_page(
        &self,
        contract: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<IndexerPage, TransportError> {
        let url = self.balance_updates_url(contract);
        trace!(%url, ?continuation_token, "[sf-02] Indexer page request");
        self.retry
            .run(TRANSPORT, || self.fetch_once(&url, limit, continuation_token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_updates_url() {
        let config = IndexerConfig {
            url: "https://api.example.org/".to_string(),
            ..IndexerConfig::for_testing()
        };
        let api = HttpIndexerApi::new(&config).unwrap();
        assert_eq!(
            api.balance_updates_url("0xabc"),
            "https://api.example.org/api/Address/0xabc/Contract/0xabc/BalanceUpdates"
        );
    }
}
