//! Log events raised by the server and by request handlers.

use std::fmt;

use serde_json::{json, Value};

use crate::clock::now_millis;

/// Category label of a log event, independent of its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Raised by application code.
    App,
    /// Raised by the server itself (handler failures).
    Internal,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::App => "app",
            Channel::Internal => "internal",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server or request scoped log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: u64,
    pub tags: Vec<String>,
    pub channel: Channel,
    pub data: Option<Value>,
    pub error: Option<String>,
    /// Id of the owning request for request-scoped events.
    pub request: Option<String>,
}

impl LogEvent {
    pub fn new<I, T>(tags: I, data: Option<Value>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            timestamp: now_millis(),
            tags: tags.into_iter().map(Into::into).collect(),
            channel: Channel::App,
            data,
            error: None,
            request: None,
        }
    }

    /// Event raised when a handler fails.
    pub fn handler_error(message: impl Into<String>) -> Self {
        let mut event = Self::new(["handler", "error"], None);
        event.channel = Channel::Internal;
        event.error = Some(message.into());
        event
    }

    pub fn for_request(mut self, id: impl Into<String>) -> Self {
        self.request = Some(id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Payload written to the backend.
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "timestamp": self.timestamp,
            "tags": self.tags,
            "channel": self.channel.as_str(),
        });

        if let Value::Object(map) = &mut value {
            if let Some(request) = &self.request {
                map.insert("request".into(), Value::from(request.as_str()));
            }
            if let Some(data) = &self.data {
                map.insert("data".into(), data.clone());
            }
            if let Some(error) = &self.error {
                map.insert("error".into(), json!({ "message": error }));
            }
        }

        value
    }
}
