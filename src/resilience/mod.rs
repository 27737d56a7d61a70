//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Policy lookup (pricing::retry):
//!     → retries.rs (is the error transient, attempts left?)
//!     → backoff.rs (exponential delay + jitter before next attempt)
//! ```

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, Backoff};
pub use retries::{effective_attempts, retry_budget, should_retry, worst_case_duration};
