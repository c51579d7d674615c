//! Request and response snapshots passed to subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::clock::now_millis;

/// What subscribers see of an in-flight request.
///
/// Built from the request head when the request arrives. The payload,
/// timings and route tags are filled in as the request moves through the
/// pipeline.
#[derive(Debug)]
pub struct RequestInfo {
    pub id: String,
    /// Lowercase method name.
    pub method: String,
    pub path: String,
    pub headers: Map<String, Value>,
    pub query: Map<String, Value>,
    pub remote_address: Option<String>,
    pub remote_port: Option<u16>,
    pub received: u64,
    responded: AtomicU64,
    completed: AtomicU64,
    route_tags: OnceLock<Vec<String>>,
    payload: OnceLock<Value>,
}

impl RequestInfo {
    pub fn new(id: impl Into<String>, method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method: method.as_ref().to_ascii_lowercase(),
            path: path.into(),
            headers: Map::new(),
            query: Map::new(),
            remote_address: None,
            remote_port: None,
            received: now_millis(),
            responded: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            route_tags: OnceLock::new(),
            payload: OnceLock::new(),
        }
    }

    pub fn with_headers(mut self, headers: Map<String, Value>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    pub fn with_payload(self, payload: Value) -> Self {
        self.set_payload(payload);
        self
    }

    pub fn with_remote(mut self, address: impl Into<String>, port: u16) -> Self {
        self.remote_address = Some(address.into());
        self.remote_port = Some(port);
        self
    }

    pub fn with_received(mut self, received: u64) -> Self {
        self.received = received;
        self
    }

    /// Tags declared by the matched route; empty until routing reaches one.
    pub fn route_tags(&self) -> &[String] {
        self.route_tags.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record the matched route's tags. Only the first call takes effect.
    pub fn set_route_tags(&self, tags: Vec<String>) {
        let _ = self.route_tags.set(tags);
    }

    /// Captured request body; null until read, or when not captured.
    pub fn payload(&self) -> &Value {
        static NONE: Value = Value::Null;
        self.payload.get().unwrap_or(&NONE)
    }

    /// Record the captured body. Only the first call takes effect.
    pub fn set_payload(&self, payload: Value) {
        let _ = self.payload.set(payload);
    }

    pub fn mark_responded(&self, at: u64) {
        self.responded.store(at, Ordering::Release);
    }

    pub fn mark_completed(&self, at: u64) {
        self.completed.store(at, Ordering::Release);
    }

    pub fn responded(&self) -> Option<u64> {
        Self::timestamp(&self.responded)
    }

    pub fn completed(&self) -> Option<u64> {
        Self::timestamp(&self.completed)
    }

    /// Completion (or response) time minus arrival time, in milliseconds.
    pub fn response_time(&self) -> u64 {
        self.completed()
            .or_else(|| self.responded())
            .unwrap_or(self.received)
            .saturating_sub(self.received)
    }

    fn timestamp(slot: &AtomicU64) -> Option<u64> {
        match slot.load(Ordering::Acquire) {
            0 => None,
            at => Some(at),
        }
    }
}

/// What subscribers see of a finished response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    pub status_code: u16,
    pub headers: Map<String, Value>,
}

impl ResponseInfo {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Map::new(),
        }
    }

    pub fn with_headers(mut self, headers: Map<String, Value>) -> Self {
        self.headers = headers;
        self
    }
}
