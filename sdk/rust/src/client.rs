use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePolicy {
    pub global_rate: f64,
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    pub timestamp: u64,
    #[serde(default)]
    pub retries: Option<u32>,
    pub price: f64,
    #[serde(default)]
    pub global_rate: Option<f64>,
    #[serde(default)]
    pub deviation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTest {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfTestReport {
    pub success: bool,
    pub tests_run: u32,
    pub tests_passed: u32,
    pub failed_tests: Vec<FailedTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub amount: f64,
    pub requested: String,
    pub currency: String,
    pub fallback: bool,
    pub converted: f64,
    pub formatted: String,
}

pub struct SymmetryClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SymmetryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attach an admin API key for `/admin` calls.
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub async fn policy(&self) -> Result<PricePolicy, SdkError> {
        let resp = self.client.get(self.url("/api/v1/policy")).send().await?;
        decode(resp).await
    }

    /// Check a price against the live policy.
    pub async fn validate(&self, price: f64) -> Result<ValidationResult, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/v1/validate"))
            .json(&json!({ "price": price }))
            .send()
            .await?;
        decode(resp).await
    }

    /// Check a price, letting the service retry its policy lookup.
    pub async fn validate_with_retry(
        &self,
        price: f64,
        max_attempts: Option<u32>,
    ) -> Result<ValidationResult, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/v1/validate/retry"))
            .json(&json!({ "price": price, "max_attempts": max_attempts }))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn convert(&self, amount: f64, currency: &str) -> Result<ConvertResponse, SdkError> {
        let resp = self
            .client
            .get(self.url("/api/v1/convert"))
            .query(&[("amount", amount.to_string()), ("currency", currency.to_string())])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn self_test(&self) -> Result<SelfTestReport, SdkError> {
        let mut req = self.client.post(self.url("/admin/self-test"));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        decode(req.send().await?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SdkError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}
