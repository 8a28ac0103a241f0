// src/error_recovery.rs
//! Retry with fixed delay for API operations.

use crate::error::AppError;
use std::time::Duration;

/// Retries an async operation with a fixed delay between attempts.
///
/// Used at the two remote call sites (search, block children listing).
/// The delay is constant rather than exponential; a run's worst-case
/// duration stays proportional to the attempt count.
pub async fn retry_with_delay<F, T, Fut>(
    mut operation: F,
    max_attempts: u32,
    delay: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                last_error = Some(e);

                if attempt < max_attempts {
                    log::warn!("Attempt {} failed, retrying after {:?}", attempt, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::InternalError {
        message: "Retry failed with no error".to_string(),
    }))
}
