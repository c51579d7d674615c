//! Logger backend subsystem.
//!
//! # Data Flow
//! ```text
//! plugin dispatch
//!     → Logger::<severity>(msg, data, fields)
//!     → Logger::write(Record)
//!     → stream.rs (one JSON line per record)
//!     → stdout / stderr / any io::Write
//!
//! write failure
//!     → ErrorEvents::emit → on_error callback (if subscribed)
//! ```
//!
//! # Design Decisions
//! - One required method (`write`); per-severity methods are provided
//! - `connect`, `close` and `error_events` are optional capabilities
//! - Fire-and-forget: no buffering, no retry

pub mod errors;
pub mod json_logger;
pub mod std_logger;
pub mod stream;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::level::LogMethod;

pub use errors::{BackendError, ErrorEvents, ErrorHandler};
pub use json_logger::JsonLogger;
pub use std_logger::StdLogger;

/// Static fields merged into every record.
pub type Fields = Map<String, Value>;

/// A formatted record handed to a backend.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub method: LogMethod,
    pub message: &'a str,
    pub data: Option<&'a Value>,
    pub fields: &'a Fields,
}

impl<'a> Record<'a> {
    pub fn new(
        method: LogMethod,
        message: &'a str,
        data: Option<&'a Value>,
        fields: &'a Fields,
    ) -> Self {
        Self {
            method,
            message,
            data,
            fields,
        }
    }
}

/// Destination for log records.
pub trait Logger: Send + Sync {
    /// Consume one record.
    fn write(&self, record: &Record<'_>);

    fn emergency(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Emergency, message, data, fields));
    }

    fn alert(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Alert, message, data, fields));
    }

    fn critical(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Critical, message, data, fields));
    }

    fn error(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Error, message, data, fields));
    }

    fn warning(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Warning, message, data, fields));
    }

    fn notice(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Notice, message, data, fields));
    }

    fn info(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Info, message, data, fields));
    }

    fn debug(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Debug, message, data, fields));
    }

    fn log(&self, message: &str, data: Option<&Value>, fields: &Fields) {
        self.write(&Record::new(LogMethod::Log, message, data, fields));
    }

    /// Open the backend before the server starts. `None` means the
    /// backend has nothing to connect.
    fn connect(&self) -> Option<BoxFuture<'_, Result<(), BackendError>>> {
        None
    }

    /// Release the backend when the server stops.
    fn close(&self) {}

    /// Error channel the plugin can subscribe `on_error` to.
    fn error_events(&self) -> Option<&ErrorEvents> {
        None
    }
}
