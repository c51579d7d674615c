//! Structured request and lifecycle logging for axum servers.
//!
//! # Data Flow
//! ```text
//! EventLayer / HttpServer ──▶ EventHub ──▶ LogPlugin (dispatch)
//!                                              │ ignore checks
//!                                              │ tag → severity
//!                                              │ threshold
//!                                              ▼
//!                                         Logger backend
//!                                      (StdLogger / JsonLogger)
//! ```

pub mod clock;
pub mod config;
pub mod events;
pub mod filter;
pub mod http;
pub mod level;
pub mod lifecycle;
pub mod logger;
pub mod plugin;

pub use config::{AppConfig, LogConfig};
pub use events::EventHub;
pub use http::{HttpServer, RequestLog, RouteTags, ServerLog};
pub use level::Severity;
pub use lifecycle::Shutdown;
pub use logger::{JsonLogger, Logger, StdLogger};
pub use plugin::{LogPlugin, PluginOptions};
