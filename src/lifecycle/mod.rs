//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (HttpServer::run):
//!     pre-start hooks (backend connect) → start event → accept traffic
//!
//! Shutdown (shutdown.rs):
//!     signal or trigger → stop accepting → drain → stop event → backend close
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
