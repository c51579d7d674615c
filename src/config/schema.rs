//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::{LevelOverride, Severity};

/// Root configuration for the `server-log` binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings for the demo server.
    pub server: ServerConfig,

    /// Which backend receives records.
    pub logger: LoggerKind,

    /// Plugin settings.
    pub log: LogConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Built-in backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggerKind {
    /// Stream pair: errors to stderr, the rest to stdout.
    #[default]
    Std,
    /// Single stream with numeric levels.
    Json,
}

/// Server event categories the plugin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Log,
    #[serde(alias = "on_request")]
    OnRequest,
    Request,
    Response,
    Start,
    Stop,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Log,
        EventKind::OnRequest,
        EventKind::Request,
        EventKind::Response,
        EventKind::Start,
        EventKind::Stop,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Log => "log",
            EventKind::OnRequest => "onRequest",
            EventKind::Request => "request",
            EventKind::Response => "response",
            EventKind::Start => "start",
            EventKind::Stop => "stop",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Fields merged into every record.
    pub additional_fields: Map<String, Value>,

    /// Severity used when no tag resolves one.
    pub default_level: Severity,

    /// Enabled event categories.
    pub events: Vec<EventKind>,

    /// Event channels to ignore.
    pub ignore_channels: Vec<String>,

    /// Request paths to ignore.
    pub ignore_paths: Vec<String>,

    /// Event and route tags to ignore.
    pub ignore_tags: Vec<String>,

    /// Least severe level still emitted.
    pub level: Severity,

    /// Tag → severity overrides; "unset" removes a default mapping.
    pub log_level_map: BTreeMap<String, LevelOverride>,
}

impl LogConfig {
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        self.events.contains(&kind)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            additional_fields: Map::new(),
            default_level: Severity::Info,
            events: EventKind::ALL.to_vec(),
            ignore_channels: Vec::new(),
            ignore_paths: Vec::new(),
            ignore_tags: Vec::new(),
            level: Severity::Info,
            log_level_map: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.default_level, Severity::Info);
        assert_eq!(config.level, Severity::Info);
        for kind in EventKind::ALL {
            assert!(config.is_enabled(kind));
        }
        assert!(config.additional_fields.is_empty());
    }

    #[test]
    fn test_parse_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            logger = "json"

            [server]
            bind_address = "0.0.0.0:9000"

            [log]
            default_level = "notice"
            level = "debug"
            events = ["log", "onRequest", "response"]
            ignore_paths = ["/health"]
            ignore_tags = ["noisy"]
            ignore_channels = ["internal"]

            [log.additional_fields]
            service = "api"

            [log.log_level_map]
            foo = "critical"
            debug = "unset"
            "#,
        )
        .unwrap();

        assert_eq!(config.logger, LoggerKind::Json);
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.log.default_level, Severity::Notice);
        assert_eq!(config.log.level, Severity::Debug);
        assert_eq!(
            config.log.events,
            vec![EventKind::Log, EventKind::OnRequest, EventKind::Response]
        );
        assert!(!config.log.is_enabled(EventKind::Start));
        assert_eq!(config.log.additional_fields["service"], "api");
        assert_eq!(config.log.log_level_map["foo"], LevelOverride::Set(Severity::Critical));
        assert_eq!(config.log.log_level_map["debug"], LevelOverride::Unset);
    }

    #[test]
    fn test_rejects_unknown_values() {
        let err = toml::from_str::<LogConfig>(r#"level = "zzz""#).unwrap_err();
        assert!(err.to_string().contains("zzz is not a valid log level"));

        assert!(toml::from_str::<LogConfig>(r#"events = ["everything"]"#).is_err());
        assert!(toml::from_str::<LogConfig>(r#"events = [5]"#).is_err());
        assert!(toml::from_str::<LogConfig>(r#"ignore_paths = [5]"#).is_err());
        assert!(toml::from_str::<LogConfig>(r#"additional_fields = 5"#).is_err());
    }

    #[test]
    fn test_event_kind_names() {
        let parsed: Vec<EventKind> = serde_json::from_str(r#"["onRequest", "on_request"]"#).unwrap();
        assert_eq!(parsed, vec![EventKind::OnRequest, EventKind::OnRequest]);
        assert_eq!(EventKind::OnRequest.to_string(), "onRequest");
    }
}
