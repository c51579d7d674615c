//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, lifecycle events)
//!     → SetRequestIdLayer (x-request-id)
//!     → layer.rs (snapshot request, on_request extensions)
//!     → RouteTags (route.rs) → handler (handle.rs: ServerLog / RequestLog)
//!     → HandlerError (error.rs) marks failed responses
//!     → layer.rs (request error event, response event)
//!     → Send to client
//! ```

pub mod error;
pub mod handle;
pub mod layer;
pub mod route;
pub mod server;

pub use error::{HandlerError, HandlerFailure};
pub use handle::{RequestLog, ServerLog};
pub use layer::EventLayer;
pub use route::RouteTags;
pub use server::{HttpServer, ServerError};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";
