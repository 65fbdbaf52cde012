//! Time utilities.

pub use std::time::{Duration, Instant};
pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval};

/// Runs `future` with an upper bound on its duration, returning `None` if the
/// bound elapsed first.
pub async fn within<F>(limit: Duration, future: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    timeout(limit, future).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_within_returns_output() {
        let value = within(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_within_gives_up_after_limit() {
        let value = within(Duration::from_millis(10), sleep(Duration::from_secs(5))).await;
        assert!(value.is_none());
    }
}
