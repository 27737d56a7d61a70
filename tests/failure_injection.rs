//! Retry behavior against unreliable policy sources.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use price_symmetry::config::{SourceKind, SymmetryConfig};
use symmetry_sdk::SymmetryClient;

mod common;

const POLICY_JSON: &str = r#"{"global_rate":1000.0,"tolerance":0.001}"#;

fn http_source_config(addr: std::net::SocketAddr) -> SymmetryConfig {
    let mut config = common::test_config();
    config.policy.source.kind = SourceKind::Http;
    config.policy.source.url = Some(format!("http://{}/policy", addr));
    config.policy.source.timeout_ms = 1000;
    config
}

#[tokio::test]
async fn test_retry_on_transient_source_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_policy_backend(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, "unavailable".into())
            } else {
                (200, POLICY_JSON.into())
            }
        }
    })
    .await;

    let server = common::start_server(http_source_config(backend)).await;
    let client = SymmetryClient::new(&server.url());

    let result = client.validate_with_retry(1000.5, Some(3)).await.unwrap();
    assert!(result.valid, "should succeed on third attempt: {}", result.message);
    assert_eq!(result.retries, Some(2));
    assert_eq!(result.global_rate, Some(1000.0));
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_exhausted_retries_surface_failure_result() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_policy_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (500, "boom".into())
        }
    })
    .await;

    let server = common::start_server(http_source_config(backend)).await;
    let client = SymmetryClient::new(&server.url());

    let result = client.validate_with_retry(1000.0, Some(4)).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.retries, Some(3));
    assert!(result.global_rate.is_none());
    assert!(result.message.contains("unavailable after 4 attempt(s)"));
    assert_eq!(call_count.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_policy_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (404, "missing".into())
        }
    })
    .await;

    let server = common::start_server(http_source_config(backend)).await;
    let client = SymmetryClient::new(&server.url());

    let result = client.validate_with_retry(1000.0, Some(5)).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.retries, Some(0));
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_source_does_not_crash() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let server = common::start_server(http_source_config(dead)).await;
    let client = SymmetryClient::new(&server.url());

    let result = client.validate_with_retry(1000.0, Some(2)).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.retries, Some(1));
}

#[tokio::test]
async fn test_hanging_source_answers_before_request_timeout() {
    let backend = common::start_silent_backend().await;

    let mut config = http_source_config(backend);
    config.policy.source.timeout_ms = 800;
    config.retries.max_attempts = 3;
    config.timeouts.request_secs = 2;
    let server = common::start_server(config).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/validate/retry", server.url()))
        .json(&serde_json::json!({ "price": 1000.0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let result: serde_json::Value = response.json().await.unwrap();
    assert_eq!(result["valid"], false);
    assert!(result["retries"].as_u64().is_some());
    assert!(result["message"].as_str().unwrap().contains("unavailable after"));
}

#[tokio::test]
async fn test_file_source_follows_file_contents() {
    let path = std::env::temp_dir().join(format!("symmetry-policy-{}.toml", std::process::id()));
    std::fs::write(&path, "global_rate = 500.0\ntolerance = 0.01\n").unwrap();

    let mut config = common::test_config();
    config.policy.source.kind = SourceKind::File;
    config.policy.source.path = Some(path.to_string_lossy().into_owned());
    let server = common::start_server(config).await;
    let client = SymmetryClient::new(&server.url());

    assert!(client.validate_with_retry(502.0, None).await.unwrap().valid);

    std::fs::write(&path, "global_rate = 800.0\ntolerance = 0.01\n").unwrap();
    assert!(!client.validate_with_retry(502.0, None).await.unwrap().valid);
    assert!(client.validate_with_retry(800.0, None).await.unwrap().valid);

    std::fs::remove_file(path).unwrap_or_default();
}
