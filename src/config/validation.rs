//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rate > 0, tolerance in (0, 1), attempts > 0)
//! - Check the policy source has what its kind needs
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::{SourceKind, SymmetryConfig};
use crate::currency::rates;
use crate::pricing::types::PricePolicy;
use crate::config::schema::DEFAULT_ADMIN_KEY;
use crate::resilience::retries::{retry_budget, worst_case_duration, MAX_ATTEMPTS_CAP};
use crate::resilience::Backoff;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SymmetryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    let rate = config.policy.global_rate;
    if !rate.is_finite() || rate <= 0.0 {
        errors.push(ValidationError::new("policy.global_rate", "must be a positive number"));
    }

    let tolerance = config.policy.tolerance;
    if !tolerance.is_finite() || tolerance <= 0.0 || tolerance >= 1.0 {
        errors.push(ValidationError::new("policy.tolerance", "must be between 0 and 1 (exclusive)"));
    }

    let source = &config.policy.source;
    match source.kind {
        SourceKind::Static => {}
        SourceKind::File => {
            if source.path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                errors.push(ValidationError::new("policy.source.path", "required for file source"));
            }
        }
        SourceKind::Http => match source.url.as_deref().map(url::Url::parse) {
            Some(Ok(u)) if u.scheme() == "http" || u.scheme() == "https" => {}
            Some(_) => errors.push(ValidationError::new("policy.source.url", "must be an http(s) URL")),
            None => errors.push(ValidationError::new("policy.source.url", "required for http source")),
        },
    }
    if source.timeout_ms == 0 {
        errors.push(ValidationError::new("policy.source.timeout_ms", "must be greater than 0"));
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 || retries.max_attempts > MAX_ATTEMPTS_CAP {
        errors.push(ValidationError::new(
            "retries.max_attempts",
            format!("must be between 1 and {}", MAX_ATTEMPTS_CAP),
        ));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new("retries.base_delay_ms", "must not exceed max_delay_ms"));
    }

    for (code, rate) in &config.currency.rates {
        let field = format!("currency.rates.{}", code);
        if rates::find(code).is_none() {
            errors.push(ValidationError::new(&field, "unsupported currency"));
        } else if !rate.is_finite() || *rate <= 0.0 {
            errors.push(ValidationError::new(&field, "must be a positive number"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if source.kind != SourceKind::Static
        && retries.max_attempts > 0
        && source.timeout_ms > 0
        && config.timeouts.request_secs > 0
    {
        let worst = worst_case_duration(
            retries.max_attempts,
            Duration::from_millis(source.timeout_ms),
            &Backoff::from(retries),
        );
        let budget = retry_budget(Duration::from_secs(config.timeouts.request_secs));
        if worst >= budget {
            errors.push(ValidationError::new(
                "retries.max_attempts",
                format!(
                    "worst-case retry time {} ms does not fit the {} ms request budget",
                    worst.as_millis(),
                    budget.as_millis()
                ),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if config.admin.enabled {
        let key = config.admin.api_key.trim();
        if key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty when admin is enabled"));
        } else if key == DEFAULT_ADMIN_KEY {
            errors.push(ValidationError::new("admin.api_key", "placeholder key must be replaced"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl SymmetryConfig {
    /// The configured policy. Only meaningful after [`validate_config`] passed.
    pub fn price_policy(&self) -> PricePolicy {
        PricePolicy::new(self.policy.global_rate, self.policy.tolerance).unwrap_or_default()
    }
}
