//! Price policy types and error definitions.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Canonical boost price in UBX used when no policy is configured.
pub const GLOBAL_UBX_RATE: f64 = 100.0;

/// Allowed fractional deviation around the global rate (0.1%).
pub const PRICE_TOLERANCE: f64 = 0.001;

/// The canonical boost price every user pays, in UBX.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GlobalRate(f64);

impl GlobalRate {
    /// Create a rate, rejecting zero, negative and non-finite values.
    pub fn new(value: f64) -> PricingResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PricingError::InvalidPolicy(format!(
                "global rate must be a positive finite number, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for GlobalRate {
    type Error = PricingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GlobalRate> for f64 {
    fn from(rate: GlobalRate) -> Self {
        rate.0
    }
}

/// Fractional deviation allowed before a price is flagged non-compliant.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ToleranceBand(f64);

impl ToleranceBand {
    /// Create a band; it must lie strictly between 0 and 1.
    pub fn new(value: f64) -> PricingResult<Self> {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(PricingError::InvalidPolicy(format!(
                "tolerance must be in (0, 1), got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ToleranceBand {
    type Error = PricingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToleranceBand> for f64 {
    fn from(band: ToleranceBand) -> Self {
        band.0
    }
}

/// The pricing policy in force: a global rate and its tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePolicy {
    /// Canonical boost price in UBX.
    pub global_rate: GlobalRate,
    /// Allowed fractional deviation.
    pub tolerance: ToleranceBand,
}

impl PricePolicy {
    /// Build a policy from raw values.
    pub fn new(global_rate: f64, tolerance: f64) -> PricingResult<Self> {
        Ok(Self {
            global_rate: GlobalRate::new(global_rate)?,
            tolerance: ToleranceBand::new(tolerance)?,
        })
    }
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self {
            global_rate: GlobalRate(GLOBAL_UBX_RATE),
            tolerance: ToleranceBand(PRICE_TOLERANCE),
        }
    }
}

/// Outcome of a single compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the price is within tolerance of the global rate.
    pub valid: bool,
    /// Human-readable explanation for badges and tables.
    pub message: String,
    /// Unix timestamp in milliseconds when the check ran.
    pub timestamp: u64,
    /// Retries consumed; only set by the retry wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// The price that was checked.
    pub price: f64,
    /// The global rate it was checked against, absent if no policy was obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_rate: Option<f64>,
    /// Fractional deviation from the global rate, absent for non-finite input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
}

impl ValidationResult {
    /// Annotate with the number of retries consumed.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// A self-test scenario that did not produce its expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTest {
    pub name: String,
    pub reason: String,
}

/// Aggregate report produced by the self-test harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfTestReport {
    pub success: bool,
    pub tests_run: u32,
    pub tests_passed: u32,
    pub failed_tests: Vec<FailedTest>,
}

/// Errors raised while obtaining the price policy.
///
/// Out-of-tolerance prices are not errors; they produce an invalid
/// [`ValidationResult`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// Temporary failure reaching the policy source.
    #[error("transient policy source failure: {0}")]
    Transient(String),

    /// Policy lookup exceeded its deadline.
    #[error("policy lookup timed out after {0} ms")]
    Timeout(u64),

    /// The caller's overall budget ran out before a policy was obtained.
    #[error("retry budget of {0} ms exhausted")]
    DeadlineExceeded(u64),

    /// Policy values are out of range.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Policy payload could not be decoded.
    #[error("malformed policy: {0}")]
    Malformed(String),
}

impl PricingError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, PricingError::Transient(_) | PricingError::Timeout(_))
    }
}

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Current wall clock in unix milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PricePolicy::default();
        assert_eq!(policy.global_rate.value(), GLOBAL_UBX_RATE);
        assert_eq!(policy.tolerance.value(), PRICE_TOLERANCE);
    }

    #[test]
    fn test_rate_rejects_non_positive() {
        assert!(GlobalRate::new(0.0).is_err());
        assert!(GlobalRate::new(-5.0).is_err());
        assert!(GlobalRate::new(f64::NAN).is_err());
        assert!(GlobalRate::new(f64::INFINITY).is_err());
        assert!(GlobalRate::new(1000.0).is_ok());
    }

    #[test]
    fn test_tolerance_bounds() {
        assert!(ToleranceBand::new(0.0).is_err());
        assert!(ToleranceBand::new(1.0).is_err());
        assert!(ToleranceBand::new(0.001).is_ok());
    }

    #[test]
    fn test_policy_deserialize_rejects_bad_values() {
        let ok: PricePolicy = serde_json::from_str(r#"{"global_rate":1000.0,"tolerance":0.001}"#).unwrap();
        assert_eq!(ok.global_rate.value(), 1000.0);

        let bad = serde_json::from_str::<PricePolicy>(r#"{"global_rate":-1.0,"tolerance":0.001}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_error_classification() {
        assert!(PricingError::Transient("reset".into()).is_transient());
        assert!(PricingError::Timeout(500).is_transient());
        assert!(!PricingError::Malformed("eof".into()).is_transient());
        assert!(!PricingError::DeadlineExceeded(900).is_transient());
        assert!(!PricingError::InvalidPolicy("rate".into()).is_transient());
        assert_eq!(PricingError::Timeout(500).to_string(), "policy lookup timed out after 500 ms");
    }
}
