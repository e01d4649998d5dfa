//! Retry with exponential backoff for transient HTTP failures, and request
//! pacing for the page crawl.
//!
//! Parse failures, 404s and other deterministic errors are returned
//! immediately; retrying them would yield the same result.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ScraperError;

/// Returns `true` if `err` is transient and worth another attempt.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: connection reset, timeout, TLS failure.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
/// With `max_retries = 2` the operation runs at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient request error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

/// Spaces request start times at least `interval` apart, however many
/// requests are in flight.
///
/// Each caller reserves the next free slot under the lock and sleeps until
/// it outside the lock, so concurrent callers queue up one interval apart.
#[derive(Debug)]
pub(crate) struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits until this caller's slot is due.
    pub(crate) async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let delay = {
            let mut next_slot = self.next_slot.lock().await;
            reserve_slot(&mut next_slot, Instant::now(), self.interval)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Claims the earliest slot not before `now` and returns how long to wait for it.
fn reserve_slot(next_slot: &mut Option<Instant>, now: Instant, interval: Duration) -> Duration {
    let slot = next_slot.map_or(now, |next| next.max(now));
    *next_slot = Some(slot + interval);
    slot.saturating_duration_since(now)
}
