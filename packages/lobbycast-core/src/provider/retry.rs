//! Bounded retry with backoff for provider commands.

use std::future::Future;
use std::time::Duration;

use crate::provider::error::ProviderResult;

/// Executes a provider command, retrying every failure with the given backoff.
///
/// The first attempt runs immediately; each entry of `delays_ms` adds one more
/// attempt after sleeping for that many milliseconds. The last error is
/// returned once all attempts are exhausted.
///
/// # Arguments
/// * `action` - Action name for logging
/// * `delays_ms` - Backoff delays between attempts
/// * `operation` - Closure that performs the provider call
pub(crate) async fn with_retry<T, F, Fut>(
    action: &str,
    delays_ms: &[u64],
    mut operation: F,
) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut result = operation().await;

    for (attempt, &delay_ms) in delays_ms.iter().enumerate() {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        log::warn!(
            "[Provider] {} failed: {}. Retrying (attempt {}/{}) after {}ms",
            action,
            err,
            attempt + 2,
            delays_ms.len() + 1,
            delay_ms
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        result = operation().await;
    }

    result
}
