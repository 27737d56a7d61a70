//! Configuration file watcher for hot reload.
//!
//! Only the policy (with its source), retry and currency sections are
//! swapped into a running service. Edits elsewhere are logged and need a
//! restart; rewrites that change nothing are dropped.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SymmetryConfig;

/// Whether `next` changes anything the running service can swap in.
fn hot_sections_differ(current: &SymmetryConfig, next: &SymmetryConfig) -> bool {
    current.policy != next.policy
        || current.retries != next.retries
        || current.currency != next.currency
}

/// Reloads the file and forwards configurations that matter.
struct Reloader {
    path: PathBuf,
    applied: SymmetryConfig,
    update_tx: mpsc::UnboundedSender<SymmetryConfig>,
}

impl Reloader {
    /// Returns true when a new configuration was sent.
    fn reload(&mut self) -> bool {
        let next = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload config, keeping current configuration"
                );
                return false;
            }
        };

        if !hot_sections_differ(&self.applied, &next) {
            if self.applied != next {
                tracing::info!("Config change outside policy, retries and currency; restart to apply");
                self.applied = next;
            } else {
                tracing::debug!("Config file rewritten without changes");
            }
            return false;
        }

        tracing::info!(
            global_rate = next.policy.global_rate,
            tolerance = next.policy.tolerance,
            source = ?next.policy.source.kind,
            "Config change detected, forwarding reload"
        );
        match self.update_tx.send(next.clone()) {
            Ok(()) => {
                self.applied = next;
                true
            }
            Err(_) => {
                tracing::warn!("Config receiver is gone, reload discarded");
                false
            }
        }
    }
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    reloader: Reloader,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, whose contents are currently `applied`.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(
        path: &Path,
        applied: SymmetryConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SymmetryConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let reloader = Reloader {
            path: path.to_path_buf(),
            applied,
            update_tx,
        };
        (Self { reloader }, update_rx)
    }

    /// Start watching the file. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.reloader.path.clone();
        let mut reloader = self.reloader;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    reloader.reload();
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
