//! Subscription registry for server lifecycle and request events.
//!
//! # Responsibilities
//! - Hold subscriptions per event category
//! - Run the `on_pre_start` and `on_request` extension points
//! - Emit events to subscribers in registration order
//!
//! # Design Decisions
//! - Subscriptions are added while the hub is mutable, then the hub is
//!   frozen behind an `Arc` for the server's lifetime
//! - Subscribers run synchronously on the emitting task
//! - `pre_start` hooks are awaited in order; the first failure aborts

use futures_util::future::BoxFuture;

use super::event::LogEvent;
use super::request::{RequestInfo, ResponseInfo};
use crate::logger::BackendError;

/// Decision returned by an `on_request` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue normal request processing.
    Continue,
    /// Short-circuit with this status code.
    Respond(u16),
}

/// Details about the running server passed to `start` subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub uri: String,
}

type PreStartHook = Box<dyn Fn() -> BoxFuture<'static, Result<(), BackendError>> + Send + Sync>;
type StartListener = Box<dyn Fn(&ServerInfo) + Send + Sync>;
type StopListener = Box<dyn Fn() + Send + Sync>;
type LogListener = Box<dyn Fn(&LogEvent) + Send + Sync>;
type RequestListener = Box<dyn Fn(&RequestInfo, &LogEvent) + Send + Sync>;
type ResponseListener = Box<dyn Fn(&RequestInfo, Option<&ResponseInfo>) + Send + Sync>;
type RequestExtension = Box<dyn Fn(&RequestInfo) -> Flow + Send + Sync>;

#[derive(Default)]
pub struct EventHub {
    pre_start: Vec<PreStartHook>,
    start: Vec<StartListener>,
    stop: Vec<StopListener>,
    log: Vec<LogListener>,
    request: Vec<RequestListener>,
    response: Vec<ResponseListener>,
    on_request: Vec<RequestExtension>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ext_pre_start<F>(&mut self, hook: F)
    where
        F: Fn() -> BoxFuture<'static, Result<(), BackendError>> + Send + Sync + 'static,
    {
        self.pre_start.push(Box::new(hook));
    }

    pub fn ext_on_request<F>(&mut self, extension: F)
    where
        F: Fn(&RequestInfo) -> Flow + Send + Sync + 'static,
    {
        self.on_request.push(Box::new(extension));
    }

    pub fn on_start<F>(&mut self, listener: F)
    where
        F: Fn(&ServerInfo) + Send + Sync + 'static,
    {
        self.start.push(Box::new(listener));
    }

    pub fn on_stop<F>(&mut self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.stop.push(Box::new(listener));
    }

    pub fn on_log<F>(&mut self, listener: F)
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        self.log.push(Box::new(listener));
    }

    pub fn on_request_event<F>(&mut self, listener: F)
    where
        F: Fn(&RequestInfo, &LogEvent) + Send + Sync + 'static,
    {
        self.request.push(Box::new(listener));
    }

    pub fn on_response<F>(&mut self, listener: F)
    where
        F: Fn(&RequestInfo, Option<&ResponseInfo>) + Send + Sync + 'static,
    {
        self.response.push(Box::new(listener));
    }

    /// Run every pre-start hook in registration order.
    pub async fn pre_start(&self) -> Result<(), BackendError> {
        for hook in &self.pre_start {
            hook().await?;
        }
        Ok(())
    }

    /// Run `on_request` extensions until one short-circuits.
    pub fn run_on_request(&self, request: &RequestInfo) -> Flow {
        for extension in &self.on_request {
            if let Flow::Respond(status) = extension(request) {
                return Flow::Respond(status);
            }
        }
        Flow::Continue
    }

    pub fn emit_start(&self, info: &ServerInfo) {
        for listener in &self.start {
            listener(info);
        }
    }

    pub fn emit_stop(&self) {
        for listener in &self.stop {
            listener();
        }
    }

    pub fn emit_log(&self, event: &LogEvent) {
        for listener in &self.log {
            listener(event);
        }
    }

    pub fn emit_request_event(&self, request: &RequestInfo, event: &LogEvent) {
        for listener in &self.request {
            listener(request, event);
        }
    }

    pub fn emit_response(&self, request: &RequestInfo, response: Option<&ResponseInfo>) {
        for listener in &self.response {
            listener(request, response);
        }
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("pre_start", &self.pre_start.len())
            .field("start", &self.start.len())
            .field("stop", &self.stop.len())
            .field("log", &self.log.len())
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("on_request", &self.on_request.len())
            .finish()
    }
}
