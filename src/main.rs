//! Price symmetry service (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌─────────────────────────────────────────────────┐
//!                     │                 PRICE SYMMETRY                  │
//!     Dashboard       │  ┌────────┐    ┌─────────┐    ┌─────────────┐   │
//!     ────────────────┼─▶│  http  │───▶│   api   │───▶│  validator  │   │
//!                     │  │ server │    │handlers │    │  (policy)   │   │
//!                     │  └────────┘    └────┬────┘    └─────────────┘   │
//!                     │                     │                           │
//!                     │                     ▼                           │
//!                     │              ┌─────────────┐   ┌────────────┐   │
//!                     │              │ retry +     │──▶│  policy    │───┼──▶ file / remote
//!                     │              │ backoff     │   │  source    │   │
//!                     │              └─────────────┘   └────────────┘   │
//!                     │                                                 │
//!                     │  config (toml, hot reload) · observability ·    │
//!                     │  currency table · admin self-test · lifecycle   │
//!                     └─────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use price_symmetry::config::{load_config, ConfigWatcher, SymmetryConfig};
use price_symmetry::http::HttpServer;
use price_symmetry::lifecycle::{wait_for_shutdown_signal, Shutdown};
use price_symmetry::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "price-symmetry")]
#[command(about = "Global boost price symmetry enforcement service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "SYMMETRY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SymmetryConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("price-symmetry v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        global_rate = config.policy.global_rate,
        tolerance = config.policy.tolerance,
        source = ?config.policy.source.kind,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server; dropping it stops notifications.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path, config.clone());
            (rx, Some(watcher.run()?))
        }
        None => {
            let (_, rx) = mpsc::unbounded_channel();
            (rx, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let signal = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    server.run(listener, config_updates, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
