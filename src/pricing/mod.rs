//! Global price symmetry enforcement.
//!
//! # Data Flow
//! ```text
//! price ──▶ validator.rs (|price - rate| / rate < tolerance) ──▶ ValidationResult
//!
//! price ──▶ retry.rs ──▶ source.rs (static | file | http)
//!               │            │ transient error → backoff, next attempt
//!               │            ▼
//!               └──────▶ validator.rs ──▶ ValidationResult { retries }
//!
//! admin ──▶ self_test.rs (exact, within, outside) ──▶ SelfTestReport
//! ```

pub mod retry;
pub mod source;
pub mod types;
pub mod validator;

pub use retry::{validate_with_deadline, validate_with_retry};
pub use self_test::{run_pricing_system_self_test, run_self_test};
pub use source::{ConfiguredSource, PolicySource};
pub use types::{
    FailedTest, GlobalRate, PricePolicy, PricingError, PricingResult, SelfTestReport,
    ToleranceBand, ValidationResult, GLOBAL_UBX_RATE, PRICE_TOLERANCE,
};
pub use validator::{validate_global_price, validate_price, PriceValidator};

use crate::config::schema::RetryConfig;
use crate::resilience::Backoff;

/// Retry wrapper with the default backoff settings.
pub async fn validate_global_price_with_retry<S: PolicySource>(
    source: &S,
    price: f64,
    retries: u32,
) -> ValidationResult {
    validate_with_retry(source, price, retries, Backoff::from(&RetryConfig::default())).await
}
