//! Per-event handling: ignore checks, severity resolution, threshold,
//! hand-off to the backend.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::LogConfig;
use crate::events::{Flow, LogEvent, RequestInfo, ResponseInfo, ServerInfo};
use crate::filter::{EventFilter, RequestFilter};
use crate::level::{LevelMap, Severity};
use crate::logger::{BackendError, Fields, Logger};

/// `res` value when the client went away before a response was produced.
pub const CANCELLED_RESPONSE: &str = "request cancelled by client";

pub(crate) struct Dispatcher {
    logger: Arc<dyn Logger>,
    levels: LevelMap,
    default_level: Severity,
    max_level: AtomicU8,
    fields: Fields,
    ignore_request: RequestFilter,
    ignore_event: EventFilter,
}

impl Dispatcher {
    pub(crate) fn new(config: &LogConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            levels: LevelMap::with_overrides(&config.log_level_map),
            default_level: config.default_level,
            max_level: AtomicU8::new(config.level.rank()),
            fields: config.additional_fields.clone(),
            ignore_request: RequestFilter::new(&config.ignore_paths, &config.ignore_tags),
            ignore_event: EventFilter::new(&config.ignore_channels, &config.ignore_tags),
        }
    }

    pub(crate) fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub(crate) fn threshold(&self) -> Severity {
        // Only ever stores ranks of valid severities.
        Severity::from_rank(self.max_level.load(Ordering::Acquire)).unwrap_or(Severity::Debug)
    }

    pub(crate) fn set_threshold(&self, level: Severity) {
        self.max_level.store(level.rank(), Ordering::Release);
    }

    pub(crate) async fn connect(&self) -> Result<(), BackendError> {
        match self.logger.connect() {
            Some(connecting) => {
                connecting.await?;
                tracing::debug!("Logger backend connected");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Severity for `tags`, or `forced` when given.
    pub(crate) fn resolve(&self, tags: &[String], forced: Option<Severity>) -> Severity {
        forced.unwrap_or_else(|| {
            self.levels
                .resolve(tags.iter().map(String::as_str), self.default_level)
        })
    }

    fn emit(&self, severity: Severity, message: &str, data: Option<&Value>) {
        let fields = &self.fields;
        match severity {
            Severity::Emergency => self.logger.emergency(message, data, fields),
            Severity::Alert => self.logger.alert(message, data, fields),
            Severity::Critical => self.logger.critical(message, data, fields),
            Severity::Error => self.logger.error(message, data, fields),
            Severity::Warning => self.logger.warning(message, data, fields),
            Severity::Notice => self.logger.notice(message, data, fields),
            Severity::Info => self.logger.info(message, data, fields),
            Severity::Debug => self.logger.debug(message, data, fields),
        }
    }

    fn log_event(&self, description: &str, event: &LogEvent, forced: Option<Severity>) {
        let severity = self.resolve(&event.tags, forced);
        let threshold = self.threshold();

        if !severity.is_within(threshold) {
            tracing::trace!(%severity, %threshold, description, "Dropped record below threshold");
            return;
        }

        self.emit(severity, description, Some(&event.to_value()));
    }

    fn ignores_request(&self, request: &RequestInfo) -> bool {
        self.ignore_request
            .ignores(&request.path, request.route_tags())
    }

    fn ignores_event(&self, event: &LogEvent) -> bool {
        self.ignore_event
            .ignores(event.channel.as_str(), &event.tags)
    }

    pub(crate) fn handle_start(&self, info: &ServerInfo) {
        tracing::debug!(uri = %info.uri, "Logging server start");
        self.emit(self.default_level, "server started", None);
    }

    pub(crate) fn handle_stop(&self, record: bool) {
        if record {
            self.emit(self.default_level, "server stopped", None);
        }
        self.logger.close();
    }

    pub(crate) fn handle_log(&self, event: &LogEvent) {
        if self.ignores_event(event) {
            return;
        }
        self.log_event("log event", event, None);
    }

    pub(crate) fn handle_request_event(&self, request: &RequestInfo, event: &LogEvent) {
        if self.ignores_event(event) || self.ignores_request(request) {
            return;
        }

        if event.is_error() {
            self.log_event("request error", event, Some(Severity::Error));
        } else {
            self.log_event("request log event", event, None);
        }
    }

    pub(crate) fn handle_response(&self, request: &RequestInfo, response: Option<&ResponseInfo>) {
        if self.ignores_request(request) {
            return;
        }

        let payload = response_payload(request, response);
        self.emit(self.default_level, "request completed", Some(&payload));
    }

    pub(crate) fn handle_on_request(&self, request: &RequestInfo) -> Flow {
        if !self.ignores_request(request) {
            let description = format!(
                "{} {} request({}) received",
                request.method.to_uppercase(),
                request.path,
                request.id
            );
            self.emit(
                self.default_level,
                &description,
                Some(&json!({ "requestId": request.id })),
            );
        }

        Flow::Continue
    }
}

/// Payload of the "request completed" record.
pub fn response_payload(request: &RequestInfo, response: Option<&ResponseInfo>) -> Value {
    let res = match response {
        Some(response) => json!({
            "statusCode": response.status_code,
            "headers": response.headers,
        }),
        None => Value::from(CANCELLED_RESPONSE),
    };

    json!({
        "req": {
            "id": request.id,
            "method": request.method,
            "path": request.path,
            "headers": request.headers,
            "remoteAddress": request.remote_address,
            "remotePort": request.remote_port,
            "query": request.query,
            "payload": request.payload(),
        },
        "res": res,
        "responseTime": request.response_time(),
    })
}
