//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with API and admin handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply hot-reloaded configuration to the live state
//! - Serve until shutdown is signalled

use arc_swap::ArcSwap;
use axum::{body::Body, http::Request, routing::get, routing::post, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::SymmetryConfig;
use crate::currency::RateTable;
use crate::http::api;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::pricing::{ConfiguredSource, PolicySource, PriceValidator};

/// State derived from one configuration snapshot.
pub struct InnerState {
    pub config: SymmetryConfig,
    pub source: ConfiguredSource,
    pub currencies: RateTable,
}

impl InnerState {
    fn from_config(config: SymmetryConfig, validator: &PriceValidator) -> Self {
        let source = ConfiguredSource::from_config(&config.policy.source, validator.clone());
        let currencies = RateTable::with_overrides(&config.currency.rates);
        Self {
            config,
            source,
            currencies,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
    pub validator: PriceValidator,
}

impl AppState {
    pub fn new(config: SymmetryConfig) -> Self {
        let validator = PriceValidator::new(config.price_policy());
        let inner = InnerState::from_config(config, &validator);
        Self {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
            validator,
        }
    }

    /// Swap in a new, already validated configuration.
    pub fn apply_config(&self, config: SymmetryConfig) {
        self.validator.update_policy(config.price_policy());
        let inner = InnerState::from_config(config, &self.validator);
        tracing::info!(source = %inner.source.describe(), "Configuration applied");
        self.inner.store(Arc::new(inner));
    }
}

/// HTTP server for the pricing API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SymmetryConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let inner = state.inner.load();
        let request_timeout = Duration::from_secs(inner.config.timeouts.request_secs);

        let mut router = Router::new()
            .route("/health", get(api::health))
            .route("/api/v1/policy", get(api::get_policy))
            .route("/api/v1/validate", post(api::validate))
            .route("/api/v1/validate/retry", post(api::validate_with_retry))
            .route("/api/v1/convert", get(api::convert))
            .route("/api/v1/currencies", get(api::currencies))
            .with_state(state.clone());

        if inner.config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        } else {
            tracing::info!("Admin routes disabled");
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id(req),
                    )
                }))
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::new(request_timeout)),
        )
    }

    /// The router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared state, for applying configuration from outside.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the live policy,
    /// source and currency table. Routes and middleware are fixed at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SymmetryConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reload_state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                reload_state.apply_config(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
