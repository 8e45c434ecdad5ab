//! Request pacing.
//!
//! Trackers and invite sources are third-party sites; consecutive requests to
//! them are spaced by a fixed minimum interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-interval limiter.
///
/// The first `acquire` returns immediately; each later call waits until at
/// least `interval` has passed since the previous one returned.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}

/// Initializes a limiter spacing requests by `delay_secs` seconds.
///
/// Returns `None` when `delay_secs` is 0 (no pacing).
pub fn init_rate_limiter(delay_secs: u64) -> Option<Arc<RateLimiter>> {
    if delay_secs == 0 {
        return None;
    }
    Some(Arc::new(RateLimiter::new(Duration::from_secs(delay_secs))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rate_limiter_disabled() {
        assert!(
            init_rate_limiter(0).is_none(),
            "Rate limiter should be disabled when delay is 0"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_rate_limiter_enabled() {
        let limiter = init_rate_limiter(2).expect("limiter should be created");
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_acquires_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }
}
