//! Backoff delay between attempts.
//!
//! The delay before attempt `n` is `n^4` milliseconds plus half of a random
//! jitter drawn from `[0, n^4)`, so it always falls in `[n^4, 1.5 * n^4)`.

use std::time::Duration;

/// Source of the random jitter.
#[derive(Clone, Default)]
pub(crate) enum Jitter {
    #[default]
    Random,

    /// Returns a value in `[0, bound)` for the given bound.
    #[cfg(test)]
    Function(std::sync::Arc<dyn Fn(u64) -> u64 + Send + Sync>),
}

impl std::fmt::Debug for Jitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "Random"),
            #[cfg(test)]
            Self::Function(_) => write!(f, "Function"),
        }
    }
}

impl Jitter {
    /// Samples a value in `[0, bound)`, or 0 when `bound` is 0.
    fn sample(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }

        match self {
            Self::Random => fastrand::u64(0..bound),
            #[cfg(test)]
            Self::Function(f) => f(bound).min(bound - 1),
        }
    }
}

/// Computes randomized quartic backoff delays.
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    jitter: Jitter,
}

impl Backoff {
    #[cfg(test)]
    pub(crate) fn with_jitter<F>(f: F) -> Self
    where
        F: Fn(u64) -> u64 + Send + Sync + 'static,
    {
        Self {
            jitter: Jitter::Function(std::sync::Arc::new(f)),
        }
    }

    /// Delay to wait before `attempt` (1-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = base_delay(attempt);
        let base_nanos = u64::try_from(base.as_nanos()).unwrap_or(u64::MAX);
        let jitter = Duration::from_nanos(self.jitter.sample(base_nanos));
        base.saturating_add(jitter / 2)
    }
}

/// The deterministic part of the delay: `attempt^4` milliseconds.
pub fn base_delay(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt).saturating_pow(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delay_is_quartic() {
        assert_eq!(base_delay(2), Duration::from_millis(16));
        assert_eq!(base_delay(3), Duration::from_millis(81));
        assert_eq!(base_delay(4), Duration::from_millis(256));
        assert_eq!(base_delay(5), Duration::from_millis(625));
    }

    #[test]
    fn test_delay_without_jitter_is_base() {
        let backoff = Backoff::with_jitter(|_| 0);
        assert_eq!(backoff.delay(2), Duration::from_millis(16));
        assert_eq!(backoff.delay(5), Duration::from_millis(625));
    }

    #[test]
    fn test_delay_adds_half_the_jitter() {
        let backoff = Backoff::with_jitter(|bound| bound / 2);
        // 81ms + (81ms / 2) / 2
        assert_eq!(backoff.delay(3), Duration::from_micros(101_250));
    }

    #[test]
    fn test_delay_with_max_jitter_stays_below_upper_bound() {
        let backoff = Backoff::with_jitter(|bound| bound);
        for attempt in 2..=10 {
            let base = base_delay(attempt);
            assert!(backoff.delay(attempt) < base + base / 2);
        }
    }

    #[test]
    fn test_random_delay_within_bounds() {
        let backoff = Backoff::default();
        for attempt in 2..=8 {
            let base = base_delay(attempt);
            for _ in 0..100 {
                let delay = backoff.delay(attempt);
                assert!(delay >= base, "attempt {}: {:?} < {:?}", attempt, delay, base);
                assert!(delay < base + base / 2, "attempt {}: {:?}", attempt, delay);
            }
        }
    }

    #[test]
    fn test_zero_attempt_has_no_delay() {
        assert_eq!(Backoff::default().delay(0), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_saturates() {
        // Must not panic on overflow.
        let _ = Backoff::default().delay(u32::MAX);
    }
}
