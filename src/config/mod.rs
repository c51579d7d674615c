//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks on [server])
//!     → AppConfig { server, logger, log }
//!     → LogConfig handed to LogPlugin::register
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → new `log.level` applied through LogPlugin::set_severity
//! ```
//!
//! # Design Decisions
//! - Plugin config is immutable once registered; only the threshold moves
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, EventKind, LogConfig, LoggerKind, ServerConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
