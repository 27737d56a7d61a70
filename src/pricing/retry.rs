//! Validation with retried policy lookup.

use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::pricing::source::PolicySource;
use crate::pricing::types::{now_millis, PricePolicy, PricingError, PricingResult, ValidationResult};
use crate::pricing::validator::validate_price;
use crate::resilience::{effective_attempts, should_retry, Backoff};

/// Fetch the policy from `source` and validate `price` against it.
///
/// Up to `max_attempts` sequential lookups are made; transient errors are
/// retried after a backoff delay. Exhausted or terminal failures produce an
/// invalid result rather than an error. The result always carries the
/// number of retries consumed.
pub async fn validate_with_retry<S: PolicySource>(
    source: &S,
    price: f64,
    max_attempts: u32,
    backoff: Backoff,
) -> ValidationResult {
    run_attempts(source, price, max_attempts, backoff, None).await
}

/// [`validate_with_retry`] bounded by an overall `budget`.
///
/// An in-flight lookup is abandoned when the budget runs out, and no backoff
/// wait is started that would end past it. Either way the caller gets the
/// terminal invalid result.
pub async fn validate_with_deadline<S: PolicySource>(
    source: &S,
    price: f64,
    max_attempts: u32,
    backoff: Backoff,
    budget: Duration,
) -> ValidationResult {
    let deadline = Instant::now() + budget;
    run_attempts(source, price, max_attempts, backoff, Some((deadline, budget))).await
}

async fn run_attempts<S: PolicySource>(
    source: &S,
    price: f64,
    max_attempts: u32,
    backoff: Backoff,
    deadline: Option<(Instant, Duration)>,
) -> ValidationResult {
    let max_attempts = effective_attempts(max_attempts);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match fetch_before(source, deadline).await {
            Ok(policy) => {
                metrics::record_policy_fetch(true);
                let result = validate_price(&policy, price).with_retries(attempt - 1);
                metrics::record_validation(result.valid);
                return result;
            }
            Err(e) => {
                metrics::record_policy_fetch(false);

                let delay = backoff.delay_for(attempt);
                let fits = deadline.map_or(true, |(at, _)| Instant::now() + delay < at);

                if fits && should_retry(&e, attempt, max_attempts) {
                    tracing::info!(
                        source = %source.describe(),
                        attempt = attempt,
                        delay = ?delay,
                        error = %e,
                        "Retrying policy lookup"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                tracing::warn!(
                    source = %source.describe(),
                    attempt = attempt,
                    out_of_budget = !fits,
                    error = %e,
                    "Policy lookup failed"
                );
                metrics::record_validation(false);
                return unavailable(price, attempt, &e);
            }
        }
    }
}

async fn fetch_before<S: PolicySource>(
    source: &S,
    deadline: Option<(Instant, Duration)>,
) -> PricingResult<PricePolicy> {
    match deadline {
        Some((at, budget)) => tokio::time::timeout_at(at, source.fetch_policy())
            .await
            .unwrap_or(Err(PricingError::DeadlineExceeded(budget.as_millis() as u64))),
        None => source.fetch_policy().await,
    }
}

fn unavailable(price: f64, attempt: u32, error: &PricingError) -> ValidationResult {
    ValidationResult {
        valid: false,
        message: format!(
            "Price policy unavailable after {} attempt(s): {}",
            attempt, error
        ),
        timestamp: now_millis(),
        retries: Some(attempt - 1),
        price,
        global_rate: None,
        deviation: None,
    }
}
