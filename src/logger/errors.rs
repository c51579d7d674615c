//! Backend error channel.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors reported by a logger backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to write log record: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to connect logger: {0}")]
    Connect(String),
}

/// Callback receiving backend errors.
pub type ErrorHandler = Arc<dyn Fn(&BackendError) + Send + Sync>;

/// Error event emitter owned by a backend.
///
/// Handlers run synchronously on the emitting thread. With no handler
/// attached the error is reported through `tracing` and otherwise dropped.
#[derive(Clone, Default)]
pub struct ErrorEvents {
    handlers: Arc<Mutex<Vec<ErrorHandler>>>,
}

impl ErrorEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_error(&self, handler: ErrorHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn emit(&self, error: BackendError) {
        // Snapshot so a handler may subscribe further handlers without deadlocking.
        let handlers: Vec<ErrorHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if handlers.is_empty() {
            tracing::error!(error = %error, "Unhandled logger backend error");
            return;
        }

        for handler in handlers {
            handler(&error);
        }
    }
}

impl std::fmt::Debug for ErrorEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorEvents")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
