//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::pricing::types::{GLOBAL_UBX_RATE, PRICE_TOLERANCE};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SymmetryConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Price policy and where it is loaded from.
    pub policy: PolicyConfig,

    /// Retry settings for policy lookups.
    pub retries: RetryConfig,

    /// Display currency overrides.
    pub currency: CurrencyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin surface settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The global price policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Canonical boost price in UBX.
    pub global_rate: f64,

    /// Allowed fractional deviation (0.001 = 0.1%).
    pub tolerance: f64,

    /// Where retried checks fetch the policy from.
    pub source: PolicySourceConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            global_rate: GLOBAL_UBX_RATE,
            tolerance: PRICE_TOLERANCE,
            source: PolicySourceConfig::default(),
        }
    }
}

/// Kind of policy source.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Use the policy from this config file.
    #[default]
    Static,
    /// Read a separate TOML policy file on every lookup.
    File,
    /// GET a JSON policy from a remote endpoint.
    Http,
}

/// Policy source configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PolicySourceConfig {
    pub kind: SourceKind,

    /// Policy file path (kind = "file").
    pub path: Option<String>,

    /// Policy endpoint URL (kind = "http").
    pub url: Option<String>,

    /// Per-lookup timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for PolicySourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Static,
            path: None,
            url: None,
            timeout_ms: 2000,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts used when the caller does not specify one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Display currency configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Per-UBX rate overrides keyed by ISO code.
    pub rates: BTreeMap<String, f64>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder key; validation refuses it once admin is enabled.
pub const DEFAULT_ADMIN_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: DEFAULT_ADMIN_KEY.to_string(),
        }
    }
}
