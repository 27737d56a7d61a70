//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! symmetry.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SymmetryConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the live price policy and currency table
//! ```
//!
//! All fields have defaults so a minimal (even empty) file is valid.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CurrencyConfig, ListenerConfig, LogFormat, ObservabilityConfig, PolicyConfig,
    PolicySourceConfig, RetryConfig, SourceKind, SymmetryConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
