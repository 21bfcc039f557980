//! Retry wrapper for archive sources.
//!
//! [`RetryingSource`] re-issues failed fetches with exponential back-off.
//! Only transient failures are retried: transport errors and 5xx answers.
//! A 404 or a missing local file fails immediately.

use std::thread;
use std::time::Duration;

use stats_core::archives::ArchiveId;
use stats_core::error::{Result, StatsError};
use stats_data::reader::ArchiveSource;

/// Delay before the first retry; doubles on each further attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

// ── RetryingSource ────────────────────────────────────────────────────────────

/// An [`ArchiveSource`] that retries transient fetch failures.
///
/// # Example
/// ```no_run
/// use stats_data::reader::DirArchiveSource;
/// use stats_runtime::retry::RetryingSource;
///
/// let source = RetryingSource::new(DirArchiveSource::new("archives"), 2);
/// ```
pub struct RetryingSource<S> {
    inner: S,
    /// Extra attempts after the first failure.
    retries: u32,
    base_delay: Duration,
}

impl<S: ArchiveSource> RetryingSource<S> {
    pub fn new(inner: S, retries: u32) -> Self {
        Self::with_base_delay(inner, retries, DEFAULT_BASE_DELAY)
    }

    pub fn with_base_delay(inner: S, retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            retries,
            base_delay,
        }
    }

    /// Back-off before attempt number `attempt` (0-based).
    ///
    /// Schedule: 0 → none, 1 → base, 2 → 2×base, 3 → 4×base, …
    fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.base_delay * 2u32.saturating_pow(attempt - 1)
        }
    }
}

impl<S: ArchiveSource> ArchiveSource for RetryingSource<S> {
    fn fetch(&self, id: ArchiveId) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            let delay = self.delay_for(attempt);
            if !delay.is_zero() {
                tracing::debug!(
                    archive = id.0,
                    attempt,
                    sleep_ms = delay.as_millis() as u64,
                    "retrying fetch after back-off"
                );
                thread::sleep(delay);
            }

            match self.inner.fetch(id) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    tracing::warn!(archive = id.0, attempt, error = %e, "fetch attempt failed");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// `true` for failures that may succeed on a later attempt.
pub fn is_transient(err: &StatsError) -> bool {
    match err {
        StatsError::Fetch { .. } => true,
        StatsError::HttpStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails for the first `failures` calls, then succeeds.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        status: Option<u16>,
    }

    impl FlakySource {
        fn new(failures: u32, status: Option<u16>) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                status,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ArchiveSource for FlakySource {
        fn fetch(&self, id: ArchiveId) -> Result<Vec<u8>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(match self.status {
                    Some(status) => StatsError::HttpStatus {
                        archive: id.0,
                        status,
                    },
                    None => StatsError::Fetch {
                        archive: id.0,
                        source: "connection reset".into(),
                    },
                });
            }
            Ok(vec![1, 2, 3])
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn retrying(inner: FlakySource, retries: u32) -> RetryingSource<FlakySource> {
        RetryingSource::with_base_delay(inner, retries, Duration::ZERO)
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let source = retrying(FlakySource::new(2, None), 2);
        assert_eq!(source.fetch(ArchiveId(1)).unwrap(), vec![1, 2, 3]);
        assert_eq!(source.inner.calls(), 3);
    }

    #[test]
    fn test_gives_up_after_retry_budget() {
        let source = retrying(FlakySource::new(5, None), 2);
        let err = source.fetch(ArchiveId(1)).unwrap_err();
        assert!(matches!(err, StatsError::Fetch { .. }));
        assert_eq!(source.inner.calls(), 3);
    }

    #[test]
    fn test_no_retry_on_client_error() {
        let source = retrying(FlakySource::new(1, Some(404)), 3);
        let err = source.fetch(ArchiveId(1)).unwrap_err();
        assert!(matches!(err, StatsError::HttpStatus { status: 404, .. }));
        assert_eq!(source.inner.calls(), 1);
    }

    #[test]
    fn test_retries_server_error() {
        let source = retrying(FlakySource::new(1, Some(503)), 1);
        assert!(source.fetch(ArchiveId(1)).is_ok());
        assert_eq!(source.inner.calls(), 2);
    }

    #[test]
    fn test_zero_retries_is_passthrough() {
        let source = retrying(FlakySource::new(1, None), 0);
        assert!(source.fetch(ArchiveId(1)).is_err());
        assert_eq!(source.inner.calls(), 1);
    }

    #[test]
    fn test_backoff_schedule() {
        let source = RetryingSource::new(FlakySource::new(0, None), 3);
        assert_eq!(source.delay_for(0), Duration::ZERO);
        assert_eq!(source.delay_for(1), Duration::from_millis(100));
        assert_eq!(source.delay_for(2), Duration::from_millis(200));
        assert_eq!(source.delay_for(3), Duration::from_millis(400));
        assert_eq!(source.describe(), "flaky");
    }
}
