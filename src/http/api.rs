//! Pricing API handlers.
//!
//! Validation endpoints always answer 200 with a result object; callers
//! render the outcome rather than handle errors.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::currency::{CurrencyInfo, DEFAULT_CURRENCY};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pricing::{validate_with_deadline, PricePolicy, ValidationResult};
use crate::resilience::{retry_budget, Backoff};

/// Body for `POST /api/v1/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub price: f64,
}

/// Body for `POST /api/v1/validate/retry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryValidateRequest {
    pub price: f64,
    /// Falls back to `retries.max_attempts` from config.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

/// Query for `GET /api/v1/convert`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertResponse {
    /// UBX amount requested.
    pub amount: f64,
    /// Currency code as requested.
    pub requested: String,
    /// Currency actually used.
    pub currency: String,
    /// Whether the requested code was unsupported and USD was used.
    pub fallback: bool,
    pub converted: f64,
    pub formatted: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_policy(State(state): State<AppState>) -> Json<PricePolicy> {
    Json(state.validator.policy())
}

pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Json<ValidationResult> {
    let start = Instant::now();
    let result = state.validator.validate(request.price);
    metrics::record_request("validate", 200, start);
    Json(result)
}

pub async fn validate_with_retry(
    State(state): State<AppState>,
    Json(request): Json<RetryValidateRequest>,
) -> Json<ValidationResult> {
    let start = Instant::now();
    let inner = state.inner.load_full();
    let max_attempts = request
        .max_attempts
        .unwrap_or(inner.config.retries.max_attempts);
    let backoff = Backoff::from(&inner.config.retries);
    let budget = retry_budget(Duration::from_secs(inner.config.timeouts.request_secs));

    let result =
        validate_with_deadline(&inner.source, request.price, max_attempts, backoff, budget).await;
    metrics::record_request("validate_retry", 200, start);
    Json(result)
}

pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Json<ConvertResponse> {
    let start = Instant::now();
    let inner = state.inner.load();
    let requested = query.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    // NaN and infinities would serialize as null.
    let amount = if query.amount.is_finite() { query.amount } else { 0.0 };

    let fallback = !inner.currencies.supports(&requested);
    let currency = inner.currencies.resolve(&requested);
    let converted = amount * currency.per_ubx;
    let formatted = crate::currency::format_with(&currency, converted);

    metrics::record_request("convert", 200, start);
    Json(ConvertResponse {
        amount,
        requested,
        currency: currency.code.to_string(),
        fallback,
        converted,
        formatted,
    })
}

pub async fn currencies(State(state): State<AppState>) -> Json<Vec<CurrencyInfo>> {
    Json(state.inner.load().currencies.all())
}
