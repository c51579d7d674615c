//! Log handles available to handlers.
//!
//! `EventLayer` inserts both into the request extensions; handlers take
//! them as extractors.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde_json::Value;

use crate::events::{EventHub, LogEvent, RequestInfo};

const MISSING_LAYER: &str = "EventLayer is not installed";

/// Raises server-level `log` events.
#[derive(Clone, Debug)]
pub struct ServerLog {
    hub: Arc<EventHub>,
}

impl ServerLog {
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self { hub }
    }

    pub fn log<I, T>(&self, tags: I, data: impl Into<Value>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.emit(LogEvent::new(tags, Some(data.into())));
    }

    pub fn emit(&self, event: LogEvent) {
        self.hub.emit_log(&event);
    }
}

/// Raises `request` events tied to the current request.
#[derive(Clone, Debug)]
pub struct RequestLog {
    request: Arc<RequestInfo>,
    hub: Arc<EventHub>,
}

impl RequestLog {
    pub fn new(request: Arc<RequestInfo>, hub: Arc<EventHub>) -> Self {
        Self { request, hub }
    }

    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    pub fn log<I, T>(&self, tags: I, data: impl Into<Value>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.emit(LogEvent::new(tags, Some(data.into())));
    }

    pub fn emit(&self, event: LogEvent) {
        let event = event.for_request(self.request.id.clone());
        self.hub.emit_request_event(&self.request, &event);
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ServerLog {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ServerLog>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, MISSING_LAYER))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestLog {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestLog>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, MISSING_LAYER))
    }
}
