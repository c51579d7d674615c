//! Structured single-stream writer with numeric levels.

use std::io::{self, Write};

use serde_json::Value;

use super::stream::{format_line, Stream};
use super::{BackendError, ErrorEvents, Logger, Record};
use crate::level::LogMethod;

/// Numeric level code written for each method.
pub const fn numeric_level(method: LogMethod) -> u8 {
    match method {
        LogMethod::Log => 10,
        LogMethod::Debug => 20,
        LogMethod::Info => 30,
        LogMethod::Notice | LogMethod::Warning => 40,
        LogMethod::Error => 50,
        LogMethod::Emergency | LogMethod::Alert | LogMethod::Critical => 60,
    }
}

#[derive(Debug)]
pub struct JsonLogger {
    stream: Stream,
    errors: ErrorEvents,
}

impl JsonLogger {
    pub fn new(stream: impl Write + Send + 'static) -> Self {
        Self {
            stream: Stream::new(stream),
            errors: ErrorEvents::new(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn try_write(&self, record: &Record<'_>) -> Result<(), BackendError> {
        let line = format_line(Value::from(numeric_level(record.method)), record)?;
        self.stream.write_line(&line)?;
        Ok(())
    }
}

impl Logger for JsonLogger {
    fn write(&self, record: &Record<'_>) {
        if let Err(err) = self.try_write(record) {
            self.errors.emit(err);
        }
    }

    fn error_events(&self) -> Option<&ErrorEvents> {
        Some(&self.errors)
    }
}
