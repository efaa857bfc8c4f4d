//! Request pacing and retry utilities for the upstream transport.
//!
//! [`RateGovernor`] is the single process-wide gate that spaces the start of
//! consecutive upstream requests. [`retry_with_backoff`] drives the bounded
//! per-call retry loop over a fixed delay schedule. Pacing is paid once per
//! logical fetch; retries reuse it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ScraperError;

/// Minimum-interval pacing gate shared by every upstream request.
///
/// Each caller reserves the next free start slot under a fair (FIFO) lock,
/// then sleeps until that slot outside the lock. Reservations are spaced by
/// at least `interval`, so `K` acquisitions span at least `(K - 1) * interval`
/// no matter how many tasks race for them.
#[derive(Debug)]
pub struct RateGovernor {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateGovernor {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until this caller may start an upstream request.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next_slot.map_or(now, |reserved| reserved.max(now));
            *next_slot = Some(slot + self.interval);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::debug!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "pacing upstream request"
            );
            tokio::time::sleep_until(slot).await;
        }
    }
}

/// Executes `operation` and retries transient failures over `delays`.
///
/// The operation runs at most `delays.len() + 1` times; `delays[n]` is the
/// sleep before retry `n + 1`. Success returns immediately. Errors for which
/// [`ScraperError::is_retriable`] is `false` are returned as-is without
/// sleeping. When the schedule runs out the last error is wrapped in
/// [`ScraperError::RetriesExhausted`].
///
/// # Backoff schedule (default)
///
/// | Attempt | Sleep before it |
/// |---------|-----------------|
/// | 1 (initial) | none |
/// | 2 | 1 s |
/// | 3 | 3 s |
/// | 4 | 7 s |
/// | 5 | 15 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    delays: &[Duration],
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0usize;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retriable() {
            return Err(err);
        }

        let Some(delay) = delays.get(attempt).copied() else {
            return Err(ScraperError::RetriesExhausted {
                attempts: attempt + 1,
                last: Box::new(err),
            });
        };

        attempt += 1;
        tracing::warn!(
            attempt,
            max_attempts = delays.len() + 1,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            soft_block = err.is_soft_block(),
            error = %err,
            "transient upstream error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            status: 429,
            url: "https://apps.lider.cl/supermercado/search".to_owned(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn k_acquisitions_take_at_least_k_minus_one_intervals() {
        let governor = RateGovernor::new(Duration::from_secs(2));
        let start = Instant::now();
        for _ in 0..4 {
            governor.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn first_acquisition_is_immediate() {
        let governor = RateGovernor::new(Duration::from_secs(2));
        let start = Instant::now();
        governor.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_spaced_by_the_interval() {
        let governor = Arc::new(RateGovernor::new(Duration::from_secs(2)));
        let mut handles = Vec::new();
        for _ in 0..5 {
            let governor = Arc::clone(&governor);
            handles.push(tokio::spawn(async move {
                governor.acquire().await;
                Instant::now()
            }));
        }

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_governor_does_not_bank_permits() {
        let governor = RateGovernor::new(Duration::from_secs(2));
        governor.acquire().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let start = Instant::now();
        governor.acquire().await;
        governor.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let governor = RateGovernor::new(Duration::ZERO);
        for _ in 0..100 {
            governor.acquire().await;
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&[Duration::ZERO; 4], || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&[Duration::ZERO; 4], || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_the_schedule_wraps_the_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&[Duration::ZERO; 4], || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ScraperError::AntiBotChallenge {
                    url: "https://www.lider.cl/".to_owned(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5, "one initial + four retries");
        match result {
            Err(ScraperError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, ScraperError::AntiBotChallenge { .. }));
            }
            other => panic!("expected RetriesExhausted, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn structural_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&[Duration::ZERO; 4], || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ScraperError::AntiBotRedirect {
                    host: "lider.queue-it.net".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::AntiBotRedirect { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_follows_the_schedule() {
        let delays = [
            Duration::from_secs(1),
            Duration::from_secs(3),
            Duration::from_secs(7),
            Duration::from_secs(15),
        ];
        let start = Instant::now();
        let result = retry_with_backoff(&delays, || async { Err::<(), _>(rate_limited()) }).await;
        assert!(result.is_err());
        assert!(start.elapsed() >= Duration::from_secs(26));
    }
}
