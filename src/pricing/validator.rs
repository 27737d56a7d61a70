//! Global price symmetry check.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::observability::metrics;
use crate::pricing::types::{now_millis, PricePolicy, ValidationResult};

/// Check `price` against `policy`.
///
/// A price is compliant when `|price - rate| / rate < tolerance`. NaN and
/// infinite prices are never compliant.
pub fn validate_price(policy: &PricePolicy, price: f64) -> ValidationResult {
    let rate = policy.global_rate.value();
    let tolerance = policy.tolerance.value();

    if !price.is_finite() {
        return ValidationResult {
            valid: false,
            message: format!("Price {} is not a finite number", price),
            timestamp: now_millis(),
            retries: None,
            price,
            global_rate: Some(rate),
            deviation: None,
        };
    }

    let deviation = (price - rate).abs() / rate;
    let valid = deviation < tolerance;

    let message = if valid {
        format!("Price {} UBX complies with global rate {} UBX", price, rate)
    } else {
        format!(
            "Price {} UBX deviates {:.4}% from global rate {} UBX (tolerance {:.4}%)",
            price,
            deviation * 100.0,
            rate,
            tolerance * 100.0
        )
    };

    ValidationResult {
        valid,
        message,
        timestamp: now_millis(),
        retries: None,
        price,
        global_rate: Some(rate),
        deviation: Some(deviation),
    }
}

/// Validate against the built-in default policy.
pub fn validate_global_price(price: f64) -> ValidationResult {
    validate_price(&PricePolicy::default(), price)
}

/// Validator bound to the live, hot-swappable policy.
#[derive(Clone)]
pub struct PriceValidator {
    policy: Arc<ArcSwap<PricePolicy>>,
}

impl PriceValidator {
    pub fn new(policy: PricePolicy) -> Self {
        Self {
            policy: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// The policy currently in force.
    pub fn policy(&self) -> PricePolicy {
        **self.policy.load()
    }

    /// Atomically replace the policy.
    pub fn update_policy(&self, policy: PricePolicy) {
        let previous = self.policy();
        if previous != policy {
            tracing::info!(
                old_rate = previous.global_rate.value(),
                new_rate = policy.global_rate.value(),
                tolerance = policy.tolerance.value(),
                "Price policy updated"
            );
        }
        self.policy.store(Arc::new(policy));
    }

    /// Check a price against the current policy.
    pub fn validate(&self, price: f64) -> ValidationResult {
        let result = validate_price(&self.policy.load(), price);
        metrics::record_validation(result.valid);
        tracing::debug!(price = price, valid = result.valid, "Price validated");
        result
    }
}

impl Default for PriceValidator {
    fn default() -> Self {
        Self::new(PricePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::GLOBAL_UBX_RATE;

    fn policy(rate: f64, tolerance: f64) -> PricePolicy {
        PricePolicy::new(rate, tolerance).unwrap()
    }

    #[test]
    fn test_exact_rate_is_valid() {
        let result = validate_price(&policy(1000.0, 0.001), 1000.0);
        assert!(result.valid);
        assert_eq!(result.deviation, Some(0.0));
        assert!(result.retries.is_none());
    }

    #[test]
    fn test_half_ubx_within_tenth_percent() {
        // 0.5 / 1000 = 0.05%, below the 0.1% band
        let result = validate_price(&policy(1000.0, 0.001), 1000.5);
        assert!(result.valid);
    }

    #[test]
    fn test_outside_tolerance_is_invalid() {
        let p = policy(1000.0, 0.001);
        assert!(!validate_price(&p, 1002.0).valid);
        assert!(!validate_price(&p, 998.0).valid);
        assert!(!validate_price(&p, 0.0).valid);
        assert!(!validate_price(&p, -1000.0).valid);
    }

    #[test]
    fn test_band_edge_is_exclusive() {
        // deviation exactly 0.5 is not strictly below 0.5
        let p = policy(2.0, 0.5);
        assert!(!validate_price(&p, 3.0).valid);
        assert!(validate_price(&p, 2.9).valid);
    }

    #[test]
    fn test_non_finite_is_invalid() {
        let p = PricePolicy::default();
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = validate_price(&p, price);
            assert!(!result.valid);
            assert!(result.deviation.is_none());
            assert!(result.message.contains("not a finite number"));
        }
    }

    #[test]
    fn test_validation_is_deterministic() {
        let first = validate_global_price(GLOBAL_UBX_RATE);
        let second = validate_global_price(GLOBAL_UBX_RATE);
        assert!(first.valid && second.valid);
        assert_eq!(first.message, second.message);
    }

    #[test]
    fn test_validator_picks_up_policy_updates() {
        let validator = PriceValidator::new(policy(100.0, 0.01));
        assert!(validator.validate(100.5).valid);

        validator.update_policy(policy(200.0, 0.01));
        assert!(!validator.validate(100.5).valid);
        assert!(validator.validate(200.0).valid);
        assert_eq!(validator.policy().global_rate.value(), 200.0);
    }
}
