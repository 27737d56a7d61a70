use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::pricing::{run_self_test, PolicySource, PricePolicy, SelfTestReport};

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub policy: PricePolicy,
    pub policy_source: String,
    pub supported_currencies: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let inner = state.inner.load();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        policy: state.validator.policy(),
        policy_source: inner.source.describe(),
        supported_currencies: inner.currencies.all().len(),
    })
}

/// Run the compliance self-test against the live policy.
pub async fn post_self_test(State(state): State<AppState>) -> Json<SelfTestReport> {
    Json(run_self_test(&state.validator.policy()))
}
