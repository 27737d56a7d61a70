//! Exponential backoff with jitter between policy lookup attempts.

use rand::Rng;
use std::time::Duration;

use crate::config::schema::RetryConfig;

/// Backoff bounds for sequential attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// No waiting between attempts.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_ms, self.max_ms)
    }

    /// Longest delay [`Backoff::delay_for`] can return, jitter included.
    pub fn max_delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let capped = self
            .base_ms
            .saturating_mul(2u64.saturating_pow(attempt - 1))
            .min(self.max_ms);
        Duration::from_millis(capped + capped / 10)
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Jitter: 0 to 10% of the delay
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200 && b2.as_millis() < 220);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn test_zero_attempt_and_none() {
        assert_eq!(calculate_backoff(0, 100, 2000), Duration::ZERO);
        assert_eq!(Backoff::none().delay_for(5), Duration::ZERO);
    }

    #[test]
    fn test_max_delay_bounds_jittered_delay() {
        let backoff = Backoff::new(100, 1000);
        assert_eq!(backoff.max_delay_for(0), Duration::ZERO);
        assert_eq!(backoff.max_delay_for(1), Duration::from_millis(110));
        assert_eq!(backoff.max_delay_for(3), Duration::from_millis(440));
        assert_eq!(backoff.max_delay_for(8), Duration::from_millis(1100));
        for attempt in 1..6 {
            assert!(backoff.delay_for(attempt) <= backoff.max_delay_for(attempt));
        }
    }

    #[test]
    fn test_from_retry_config() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay_ms: 50,
            max_delay_ms: 400,
        };
        let backoff = Backoff::from(&config);
        assert_eq!(backoff, Backoff::new(50, 400));
    }
}
