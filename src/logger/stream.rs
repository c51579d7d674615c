//! Line serialization and locked output streams.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use super::{BackendError, Record};
use crate::clock::now_millis;

/// An output stream shared by concurrent writers.
pub struct Stream {
    inner: Mutex<Box<dyn Write + Send>>,
}

impl Stream {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(writer)),
        }
    }

    /// Write `line` followed by a newline and flush.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Stream")
    }
}

/// Serialize a record as one JSON object:
/// `level`, `time`, `msg`, then the additional fields, then `data`.
///
/// Additional fields may overwrite `level`, `time` and `msg`. `data` is
/// omitted when absent or null.
pub fn format_line(level: Value, record: &Record<'_>) -> Result<String, BackendError> {
    let mut line = Map::new();
    line.insert("level".into(), level);
    line.insert("time".into(), Value::from(now_millis()));
    line.insert("msg".into(), Value::from(record.message));

    for (key, value) in record.fields {
        line.insert(key.clone(), value.clone());
    }

    if let Some(data) = record.data.filter(|data| !data.is_null()) {
        line.insert("data".into(), data.clone());
    }

    Ok(serde_json::to_string(&Value::Object(line))?)
}
