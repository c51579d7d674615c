//! Logging plugin.
//!
//! # Responsibilities
//! - Validate options and build the level map and ignore predicates
//! - Subscribe to the enabled event categories on the hub
//! - Connect the backend before start, close it on stop
//! - Forward backend errors to `on_error`
//! - Expose the runtime threshold
//!
//! # Design Decisions
//! - Registration cannot fail: a typed `LogConfig` is always valid, bad
//!   option values are rejected when the config is deserialized
//! - Only `log` and `request` records go through the threshold; lifecycle
//!   and request/response records are written at the default level
//! - The threshold is a single atomic; changes apply to the next event

mod dispatch;

use std::sync::Arc;

use crate::config::{EventKind, LogConfig};
use crate::events::EventHub;
use crate::level::{Severity, UnknownLevel};
use crate::logger::{BackendError, ErrorHandler, Logger, StdLogger};

use dispatch::Dispatcher;

pub use dispatch::{response_payload, CANCELLED_RESPONSE};

/// Options passed to [`LogPlugin::register`].
#[derive(Default)]
pub struct PluginOptions {
    pub config: LogConfig,
    /// Backend; a [`StdLogger`] on the standard streams when absent.
    pub logger: Option<Arc<dyn Logger>>,
    /// Receives errors the backend reports on its error channel.
    pub on_error: Option<ErrorHandler>,
}

impl PluginOptions {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BackendError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }
}

/// Handle to a registered plugin.
#[derive(Clone)]
pub struct LogPlugin {
    dispatcher: Arc<Dispatcher>,
}

impl LogPlugin {
    /// Subscribe to `hub` according to `options`.
    pub fn register(hub: &mut EventHub, options: PluginOptions) -> Self {
        let PluginOptions {
            config,
            logger,
            on_error,
        } = options;

        let logger = logger.unwrap_or_else(|| Arc::new(StdLogger::stdio()));

        if let Some(handler) = on_error {
            match logger.error_events() {
                Some(events) => events.on_error(handler),
                None => tracing::debug!("Logger has no error events, on_error not attached"),
            }
        }

        let dispatcher = Arc::new(Dispatcher::new(&config, logger));

        let d = dispatcher.clone();
        hub.ext_pre_start(move || {
            let d = d.clone();
            Box::pin(async move { d.connect().await })
        });

        let d = dispatcher.clone();
        let record_stop = config.is_enabled(EventKind::Stop);
        hub.on_stop(move || d.handle_stop(record_stop));

        if config.is_enabled(EventKind::Start) {
            let d = dispatcher.clone();
            hub.on_start(move |info| d.handle_start(info));
        }

        if config.is_enabled(EventKind::Log) {
            let d = dispatcher.clone();
            hub.on_log(move |event| d.handle_log(event));
        }

        if config.is_enabled(EventKind::Request) {
            let d = dispatcher.clone();
            hub.on_request_event(move |request, event| d.handle_request_event(request, event));
        }

        if config.is_enabled(EventKind::Response) {
            let d = dispatcher.clone();
            hub.on_response(move |request, response| d.handle_response(request, response));
        }

        if config.is_enabled(EventKind::OnRequest) {
            let d = dispatcher.clone();
            hub.ext_on_request(move |request| d.handle_on_request(request));
        }

        tracing::debug!(
            events = ?config.events,
            level = %config.level,
            default_level = %config.default_level,
            "Log plugin registered"
        );

        Self { dispatcher }
    }

    /// Current threshold.
    pub fn level(&self) -> Severity {
        self.dispatcher.threshold()
    }

    /// Replace the threshold by name.
    pub fn set_level(&self, name: &str) -> Result<(), UnknownLevel> {
        let level = name.parse()?;
        self.set_severity(level);
        Ok(())
    }

    pub fn set_severity(&self, level: Severity) {
        let previous = self.dispatcher.threshold();
        self.dispatcher.set_threshold(level);
        tracing::info!(%previous, %level, "Log level changed");
    }

    /// Severity a set of tags resolves to under this plugin's map.
    pub fn resolve<I, T>(&self, tags: I) -> Severity
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.dispatcher.resolve(&tags, None)
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        self.dispatcher.logger()
    }
}

impl std::fmt::Debug for LogPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogPlugin")
            .field("level", &self.level())
            .finish()
    }
}
