use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retries a fallible async operation with exponential backoff.
///
/// Used at the record-store boundary where transient backend unavailability
/// should not fail a verdict application outright. The final error is
/// returned untouched once attempts are exhausted.
pub async fn with_backoff<T, E, F, Fut>(
    operation: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut action: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match action().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts => {
                let delay = base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(operation, attempt, error = %error, "Operation failed, backing off before retry");
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
