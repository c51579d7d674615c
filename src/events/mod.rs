//! Host event subsystem.
//!
//! # Data Flow
//! ```text
//! HttpServer::run
//!     → hub.pre_start()      (await backend connect)
//!     → hub.emit_start()
//!     → per request (http::EventLayer):
//!         run_on_request → handler (ServerLog / RequestLog)
//!         → emit_log / emit_request_event
//!         → emit_response
//!     → hub.emit_stop()
//! ```
//!
//! # Design Decisions
//! - The hub knows nothing about logging; plugins subscribe to it
//! - Event payloads are plain data, independent of axum types

pub mod event;
pub mod hub;
pub mod request;

pub use event::{Channel, LogEvent};
pub use hub::{EventHub, Flow, ServerInfo};
pub use request::{RequestInfo, ResponseInfo};
