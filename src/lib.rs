//! Global Price Symmetry enforcement service library.
//!
//! Every user pays the same boost price in UBX regardless of region. This
//! crate checks submitted prices against that policy, retries policy
//! lookups against sources that can fail transiently, runs a compliance
//! self-test and formats UBX amounts in display currencies.

pub mod admin;
pub mod config;
pub mod currency;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pricing;
pub mod resilience;

pub use config::schema::SymmetryConfig;
pub use currency::convert_ubx_to_local_currency;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pricing::{
    run_pricing_system_self_test, validate_global_price, validate_global_price_with_retry,
    PricePolicy, SelfTestReport, ValidationResult, GLOBAL_UBX_RATE, PRICE_TOLERANCE,
};
