//! Retry policy for outbound HTTP calls.
//!
//! Generalizes a fixed/exponential retry policy (as used for graph-execution
//! retries elsewhere in this codebase) to HTTP status codes: a policy names
//! the statuses worth retrying, in addition to transport-level failures.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Retry policy for one external-service operation.
///
/// `max_attempts = 1` means "try once, never retry" (the default for every
/// client except the knowledge-graph search calls).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub retryable_statuses: &'static [u16],
}

impl RetryPolicy {
    /// No retry: exactly one attempt, any failure is reported immediately.
    pub const fn none() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(0),
            multiplier: 1.0,
            retryable_statuses: &[],
        }
    }

    /// Exponential backoff policy: `initial_backoff * multiplier^attempt`, capped implicitly
    /// by `max_attempts`.
    pub const fn exponential(
        max_attempts: usize,
        initial_backoff: Duration,
        multiplier: f64,
        retryable_statuses: &'static [u16],
    ) -> Self {
        RetryPolicy {
            max_attempts,
            initial_backoff,
            multiplier,
            retryable_statuses,
        }
    }

    fn delay(&self, attempt: usize) -> Duration {
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(secs)
    }

    fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

/// The knowledge-graph client's retry policy: three total attempts, exponential
/// backoff 1s/2s/4s, retrying on 429/500/502/503/504 and connection errors.
pub const KNOWLEDGE_GRAPH_RETRY: RetryPolicy = RetryPolicy::exponential(
    3,
    Duration::from_secs(1),
    2.0,
    &[429, 500, 502, 503, 504],
);

/// Runs `attempt_fn` under `policy`, retrying on transport errors and on statuses the
/// policy marks retryable. Returns the first successful (2xx) response, or the last
/// error once attempts are exhausted.
pub async fn with_retries<F, Fut>(
    policy: &RetryPolicy,
    service: &'static str,
    mut attempt_fn: F,
) -> Result<reqwest::Response, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0usize;
    loop {
        match attempt_fn().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return Ok(resp);
                }
                let status_u16 = status.as_u16();
                if policy.is_retryable_status(status_u16) && attempt + 1 < policy.max_attempts {
                    tracing::warn!(service, status = status_u16, attempt, "retrying after status");
                    tokio::time::sleep(policy.delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                let body = resp.text().await.unwrap_or_default();
                return Err(ClientError::Status {
                    service,
                    status: status_u16,
                    body,
                });
            }
            Err(e) => {
                if attempt + 1 < policy.max_attempts {
                    tracing::warn!(service, error = %e, attempt, "retrying after transport error");
                    tokio::time::sleep(policy.delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                if e.is_timeout() {
                    return Err(ClientError::Timeout { service });
                }
                return Err(ClientError::Transport(e.to_string()));
            }
        }
    }
}
