//! Retry decisions.
//!
//! Only the policy lookup is retried, never the arithmetic. Attempts are
//! sequential and bounded; transient source errors are retryable, anything
//! else ends the loop.

use std::time::Duration;

use crate::pricing::types::PricingError;
use crate::resilience::backoff::Backoff;

/// Upper bound on attempts accepted from callers.
pub const MAX_ATTEMPTS_CAP: u32 = 10;

/// Normalize a requested attempt count: zero means one, and the cap applies.
pub fn effective_attempts(requested: u32) -> u32 {
    requested.clamp(1, MAX_ATTEMPTS_CAP)
}

/// Whether to try again after `attempt` (1-based) failed with `error`.
pub fn should_retry(error: &PricingError, attempt: u32, max_attempts: u32) -> bool {
    attempt < max_attempts && error.is_transient()
}

/// Share of the request timeout a retried validation may spend, so the
/// terminal result is written before the timeout layer answers 408.
pub fn retry_budget(request_timeout: Duration) -> Duration {
    request_timeout - request_timeout / 10
}

/// Longest a full retry run can take when every attempt times out.
pub fn worst_case_duration(
    max_attempts: u32,
    attempt_timeout: Duration,
    backoff: &Backoff,
) -> Duration {
    let max_attempts = effective_attempts(max_attempts);
    let waits: Duration = (1..max_attempts).map(|a| backoff.max_delay_for(a)).sum();
    attempt_timeout * max_attempts + waits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_attempts() {
        assert_eq!(effective_attempts(0), 1);
        assert_eq!(effective_attempts(3), 3);
        assert_eq!(effective_attempts(500), MAX_ATTEMPTS_CAP);
    }

    #[test]
    fn test_should_retry() {
        let transient = PricingError::Transient("connection reset".into());
        let terminal = PricingError::Malformed("bad json".into());

        assert!(should_retry(&transient, 1, 3));
        assert!(should_retry(&transient, 2, 3));
        assert!(!should_retry(&transient, 3, 3));
        assert!(!should_retry(&terminal, 1, 3));
    }

    #[test]
    fn test_retry_budget_leaves_headroom() {
        assert_eq!(retry_budget(Duration::from_secs(1)), Duration::from_millis(900));
        assert_eq!(retry_budget(Duration::from_secs(30)), Duration::from_secs(27));
    }

    #[test]
    fn test_worst_case_duration() {
        let backoff = Backoff::new(100, 2000);
        let timeout = Duration::from_millis(2000);

        assert_eq!(worst_case_duration(1, timeout, &backoff), Duration::from_millis(2000));
        // 3 x 2000 + 110 + 220
        assert_eq!(worst_case_duration(3, timeout, &backoff), Duration::from_millis(6330));
        assert_eq!(
            worst_case_duration(0, timeout, &backoff),
            worst_case_duration(1, timeout, &backoff)
        );
        assert_eq!(
            worst_case_duration(99, timeout, &backoff),
            worst_case_duration(MAX_ATTEMPTS_CAP, timeout, &backoff)
        );
    }
}
