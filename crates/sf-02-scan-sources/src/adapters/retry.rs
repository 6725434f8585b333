//! # Bounded Retry
//!
//! Every outbound call runs under exponential backoff capped by a retry
//! count, and the whole attempt sequence under one deadline. Each attempt
//! gets an equal share of that deadline, so a hung attempt times out and is
//! retried instead of consuming the whole call. Only retryable transport
//! errors are retried.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::time::timeout;
use tracing::warn;

use feed_telemetry::TRANSPORT_FAILURES;
use shared_types::TransportError;

/// Retry and deadline policy of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline covering all attempts.
    pub call_timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// First backoff delay.
    pub min_delay: Duration,
}

impl RetryPolicy {
    /// Deadline of a single attempt: the call deadline split evenly over
    /// the first attempt and every retry.
    pub fn attempt_timeout(&self) -> Duration {
        let attempts = u32::try_from(self.max_retries.saturating_add(1)).unwrap_or(u32::MAX);
        self.call_timeout / attempts
    }

    /// Run `operation` under the policy. `transport` labels metrics and logs.
    pub async fn run<T, F, Fut>(
        &self,
        transport: &str,
        mut operation: F,
    ) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let strategy = ExponentialBuilder::default()
            .with_max_times(self.max_retries)
            .with_min_delay(self.min_delay);

        let attempt_timeout = self.attempt_timeout();
        let attempt = || {
            let call = operation();
            async move {
                timeout(attempt_timeout, call).await.unwrap_or_else(|_| {
                    Err(TransportError::Timeout(attempt_timeout.as_millis() as u64))
                })
            }
        };

        let result = timeout(
            self.call_timeout,
            attempt
                .retry(strategy)
                .when(TransportError::is_retryable)
                .notify(|err: &TransportError, dur: Duration| {
                    warn!(transport, error = %err, "Transport error, retrying after {:?}", dur);
                })
                .sleep(tokio::time::sleep),
        )
        .await
        .unwrap_or_else(|_| Err(TransportError::Timeout(self.call_timeout.as_millis() as u64)));

        if result.is_err() {
            TRANSPORT_FAILURES.with_label_values(&[transport]).inc();
        }
        result
    }
}
