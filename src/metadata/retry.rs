use std::time::Duration;

/// Retry/backoff configuration for metadata requests.
///
/// A failed request is retried up to `max_attempts - 1` times, sleeping with
/// exponential backoff between `min_backoff` and `max_backoff`. The backoff
/// includes small jitter so a fleet of instances refreshing on the same
/// schedule does not hit the metadata server in lockstep.
///
/// If `min_backoff > max_backoff`, they are swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub min_backoff: Duration,
    /// Maximum delay between retries.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// A configuration that performs a single attempt.
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub(crate) fn normalize(mut self) -> Self {
        if self.min_backoff > self.max_backoff {
            std::mem::swap(&mut self.min_backoff, &mut self.max_backoff);
        }
        self.max_attempts = self.max_attempts.max(1);
        self
    }
}

/// Exponential backoff with small jitter.
///
/// Doubles `current`, clamps it to `max`, then adds 0-10% jitter (still clamped).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn next_backoff(current: Duration, max: Duration) -> Duration {
    let cur = current.as_millis().min(u128::from(u64::MAX)) as u64;
    let max = max.as_millis().min(u128::from(u64::MAX)) as u64;

    let base = cur.saturating_mul(2).min(max);
    if base == 0 {
        return Duration::ZERO;
    }

    let jitter = base / 10;
    let add = if jitter > 0 {
        fastrand::u64(0..=jitter)
    } else {
        0
    };

    Duration::from_millis(base.saturating_add(add).min(max))
}
