use std::future::Future;
use std::time::Duration;

use crate::PromptgateError;

/// Races `operation` against a timer. Whichever settles first determines the
/// outcome; the timer winning yields a `Timeout` error carrying `label` and
/// the configured bound in milliseconds.
///
/// The losing future is dropped, which aborts in-flight work at its next
/// await point. Work the remote side has already committed to may still run
/// to completion; its result is discarded.
pub async fn race_with_timeout<T, F>(
    operation: F,
    timeout: Duration,
    label: &str,
) -> Result<T, PromptgateError>
where
    F: Future<Output = Result<T, PromptgateError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(PromptgateError::Timeout {
            label: label.to_string(),
            ms: timeout.as_millis() as u64,
        }),
    }
}
