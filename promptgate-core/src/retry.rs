use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::PromptgateError;

/// Re-invokes a fallible operation up to `max_retries` additional times after
/// the first failure, sleeping `base_delay * 2^(attempt-1) * jitter` between
/// attempts with jitter drawn uniformly from `[0.75, 1.25]`.
///
/// The policy is agnostic to the error kind: any failure, including a
/// timeout, is retried identically. Callers decide what to wrap in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs `make_op` until it succeeds or attempts are exhausted. Total
    /// attempts = `1 + max_retries`; the most recent error is rethrown.
    pub async fn run<T, F, Fut>(&self, mut make_op: F) -> Result<T, PromptgateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PromptgateError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match make_op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt > self.max_retries {
                        return Err(error);
                    }
                    tracing::debug!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "attempt failed, backing off before retry"
                    );
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                }
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.75..=1.25);
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1)) as f64;
        self.base_delay.mul_f64(exponent * jitter)
    }
}
