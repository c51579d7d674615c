//! Stream-pair writer.
//!
//! Emergency, alert, critical and error records go to the error stream;
//! everything else goes to the output stream.

use std::io::{self, Write};

use serde_json::Value;

use super::stream::{format_line, Stream};
use super::{BackendError, ErrorEvents, Logger, Record};

#[derive(Debug)]
pub struct StdLogger {
    stdout: Stream,
    stderr: Stream,
    errors: ErrorEvents,
}

impl StdLogger {
    pub fn new(
        stdout: impl Write + Send + 'static,
        stderr: impl Write + Send + 'static,
    ) -> Self {
        Self {
            stdout: Stream::new(stdout),
            stderr: Stream::new(stderr),
            errors: ErrorEvents::new(),
        }
    }

    /// Writer bound to the process standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    fn try_write(&self, record: &Record<'_>) -> Result<(), BackendError> {
        let line = format_line(Value::from(record.method.as_str()), record)?;
        let stream = if record.method.is_error() {
            &self.stderr
        } else {
            &self.stdout
        };
        stream.write_line(&line)?;
        Ok(())
    }
}

impl Logger for StdLogger {
    fn write(&self, record: &Record<'_>) {
        if let Err(err) = self.try_write(record) {
            self.errors.emit(err);
        }
    }

    fn error_events(&self) -> Option<&ErrorEvents> {
        Some(&self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::{BrokenStream, SharedBuffer};
    use crate::logger::Fields;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn logger() -> (StdLogger, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        (StdLogger::new(out.clone(), err.clone()), out, err)
    }

    #[test]
    fn test_info_goes_to_stdout() {
        let (logger, out, err) = logger();
        logger.info("my msg", None, &Fields::new());
        assert!(out.contents().contains("my msg"));
        assert!(!err.contents().contains("my msg"));
    }

    #[test]
    fn test_error_goes_to_stderr() {
        let (logger, out, err) = logger();
        logger.error("my error", None, &Fields::new());
        assert!(err.contents().contains("my error"));
        assert!(!out.contents().contains("my error"));
    }

    #[test]
    fn test_stream_split_per_method() {
        let (logger, out, err) = logger();
        let fields = Fields::new();
        logger.emergency("e", None, &fields);
        logger.alert("a", None, &fields);
        logger.critical("c", None, &fields);
        logger.error("r", None, &fields);
        logger.warning("w", None, &fields);
        logger.notice("n", None, &fields);
        logger.info("i", None, &fields);
        logger.debug("d", None, &fields);
        logger.log("l", None, &fields);

        let levels = |lines: Vec<serde_json::Value>| -> Vec<String> {
            lines
                .iter()
                .map(|line| line["level"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(levels(err.lines()), ["emergency", "alert", "critical", "error"]);
        assert_eq!(levels(out.lines()), ["warning", "notice", "info", "debug", "log"]);
    }

    #[test]
    fn test_additional_fields_and_data() {
        let (logger, out, _) = logger();
        let mut fields = Fields::new();
        fields.insert("test".into(), json!("test"));
        logger.info("my msg", Some(&json!({ "foo": "bar" })), &fields);

        let output = out.contents();
        assert!(output.contains("\"msg\":\"my msg\""));
        assert!(output.contains("\"test\":\"test\""));
        assert!(output.contains("\"data\":{\"foo\":\"bar\"}"));
    }

    #[test]
    fn test_write_failure_reaches_error_events() {
        let logger = StdLogger::new(BrokenStream, BrokenStream);
        let seen = Arc::new(AtomicBool::new(false));
        let flag = seen.clone();
        logger
            .error_events()
            .unwrap()
            .on_error(Arc::new(move |err| {
                assert!(matches!(err, BackendError::Io(_)));
                flag.store(true, Ordering::SeqCst);
            }));

        logger.info("lost", None, &Fields::new());
        assert!(seen.load(Ordering::SeqCst));
    }
}
