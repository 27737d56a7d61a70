//! Policy sources.
//!
//! The retry wrapper fetches the policy through a [`PolicySource`] before
//! each check. Static sources never fail; file and HTTP sources can fail
//! transiently and are the reason retries exist at all.

use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::schema::{PolicySourceConfig, SourceKind};
use crate::pricing::types::{PricePolicy, PricingError, PricingResult};
use crate::pricing::validator::PriceValidator;

/// Something that can produce the current price policy.
pub trait PolicySource: Send + Sync {
    /// Fetch the policy. Transient errors may be retried by the caller.
    fn fetch_policy(&self) -> impl Future<Output = PricingResult<PricePolicy>> + Send;

    /// Short label for logs and metrics.
    fn describe(&self) -> String;
}

/// Wire form of a policy before range checks.
#[derive(Debug, Deserialize)]
struct RawPolicy {
    global_rate: f64,
    tolerance: f64,
}

impl RawPolicy {
    fn into_policy(self) -> PricingResult<PricePolicy> {
        PricePolicy::new(self.global_rate, self.tolerance)
    }
}

/// Source selected by configuration.
#[derive(Clone)]
pub enum ConfiguredSource {
    /// The in-process policy held by the validator.
    Static(PriceValidator),
    /// A TOML policy file read on every fetch.
    File { path: PathBuf, timeout: Duration },
    /// A remote JSON policy endpoint.
    Http {
        client: reqwest::Client,
        url: url::Url,
        timeout: Duration,
    },
}

impl ConfiguredSource {
    /// Build the source described by `config`.
    ///
    /// Config validation guarantees `path`/`url` are present for the kinds
    /// that need them; a missing value degrades to the static source.
    pub fn from_config(config: &PolicySourceConfig, validator: PriceValidator) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        match config.kind {
            SourceKind::Static => ConfiguredSource::Static(validator),
            SourceKind::File => match &config.path {
                Some(path) => ConfiguredSource::File {
                    path: PathBuf::from(path),
                    timeout,
                },
                None => {
                    tracing::warn!("File policy source has no path, using static policy");
                    ConfiguredSource::Static(validator)
                }
            },
            SourceKind::Http => match config.url.as_deref().map(url::Url::parse) {
                Some(Ok(url)) => ConfiguredSource::Http {
                    client: reqwest::Client::new(),
                    url,
                    timeout,
                },
                _ => {
                    tracing::warn!("HTTP policy source has no valid url, using static policy");
                    ConfiguredSource::Static(validator)
                }
            },
        }
    }
}

impl PolicySource for ConfiguredSource {
    async fn fetch_policy(&self) -> PricingResult<PricePolicy> {
        match self {
            ConfiguredSource::Static(validator) => Ok(validator.policy()),
            ConfiguredSource::File { path, timeout } => fetch_file(path, *timeout).await,
            ConfiguredSource::Http { client, url, timeout } => {
                fetch_http(client, url, *timeout).await
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredSource::Static(_) => "static".to_string(),
            ConfiguredSource::File { path, .. } => format!("file:{}", path.display()),
            ConfiguredSource::Http { url, .. } => format!("http:{}", url),
        }
    }
}

async fn fetch_file(path: &Path, timeout: Duration) -> PricingResult<PricePolicy> {
    let content = match tokio::time::timeout(timeout, tokio::fs::read_to_string(path)).await {
        Ok(Ok(content)) => content,
        Ok(Err(e)) => return Err(PricingError::Transient(format!("read {}: {}", path.display(), e))),
        Err(_) => return Err(PricingError::Timeout(timeout.as_millis() as u64)),
    };

    let raw: RawPolicy =
        toml::from_str(&content).map_err(|e| PricingError::Malformed(e.to_string()))?;
    raw.into_policy()
}

async fn fetch_http(
    client: &reqwest::Client,
    url: &url::Url,
    timeout: Duration,
) -> PricingResult<PricePolicy> {
    let timeout_ms = timeout.as_millis() as u64;
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_reqwest_error(e, timeout_ms))?;

    let status = response.status();
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(PricingError::Transient(format!("policy endpoint returned {}", status)));
    }
    if !status.is_success() {
        return Err(PricingError::Malformed(format!("policy endpoint returned {}", status)));
    }

    let raw: RawPolicy = response
        .json()
        .await
        .map_err(|e| classify_reqwest_error(e, timeout_ms))?;
    raw.into_policy()
}

fn classify_reqwest_error(e: reqwest::Error, timeout_ms: u64) -> PricingError {
    if e.is_timeout() {
        PricingError::Timeout(timeout_ms)
    } else if e.is_decode() {
        PricingError::Malformed(e.to_string())
    } else {
        PricingError::Transient(e.to_string())
    }
}
