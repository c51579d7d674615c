//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use server_log::config::{LogConfig, ServerConfig};
use server_log::http::{HandlerError, ServerError};
use server_log::logger::{BackendError, ErrorEvents, Record};
use server_log::{
    EventHub, HttpServer, LogPlugin, Logger, PluginOptions, RequestLog, RouteTags, ServerLog,
    Shutdown,
};

/// One call observed by [`MockLogger`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Connect,
    Close,
    Write {
        level: &'static str,
        message: String,
        data: Option<Value>,
        fields: Map<String, Value>,
    },
}

impl Item {
    pub fn level(&self) -> Option<&'static str> {
        match self {
            Item::Write { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Item::Write { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Item::Write { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum ConnectMode {
    Succeed,
    Fail(String),
    Unsupported,
}

/// Backend recording every call in order.
#[derive(Debug)]
pub struct MockLogger {
    items: Mutex<Vec<Item>>,
    errors: ErrorEvents,
    connect: ConnectMode,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::with_mode(ConnectMode::Succeed)
    }

    /// A backend with no connect step.
    pub fn without_connect() -> Self {
        Self::with_mode(ConnectMode::Unsupported)
    }

    /// A backend whose connect step fails with `message`.
    pub fn failing_connect(message: &str) -> Self {
        Self::with_mode(ConnectMode::Fail(message.to_string()))
    }

    fn with_mode(connect: ConnectMode) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            errors: ErrorEvents::new(),
            connect,
        }
    }

    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    /// Only the written records.
    pub fn writes(&self) -> Vec<Item> {
        self.items()
            .into_iter()
            .filter(|item| matches!(item, Item::Write { .. }))
            .collect()
    }

    /// Raise an error on the backend's error channel.
    pub fn fail(&self, error: BackendError) {
        self.errors.emit(error);
    }

    fn push(&self, item: Item) {
        self.items.lock().unwrap().push(item);
    }
}

impl Default for MockLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MockLogger {
    fn write(&self, record: &Record<'_>) {
        self.push(Item::Write {
            level: record.method.as_str(),
            message: record.message.to_string(),
            data: record.data.cloned(),
            fields: record.fields.clone(),
        });
    }

    fn connect(&self) -> Option<futures_util::future::BoxFuture<'_, Result<(), BackendError>>> {
        let result = match &self.connect {
            ConnectMode::Unsupported => return None,
            ConnectMode::Succeed => {
                self.push(Item::Connect);
                Ok(())
            }
            ConnectMode::Fail(message) => Err(BackendError::Connect(message.clone())),
        };
        Some(Box::pin(async move { result }))
    }

    fn close(&self) {
        self.push(Item::Close);
    }

    fn error_events(&self) -> Option<&ErrorEvents> {
        Some(&self.errors)
    }
}

/// An `io::Write` whose bytes tests can inspect.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A plugin-equipped server plus the handles tests inspect.
pub struct TestServer {
    pub server: HttpServer,
    pub plugin: LogPlugin,
    pub logger: Arc<MockLogger>,
}

impl TestServer {
    /// Send one in-process request; returns status and body text.
    pub async fn inject(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.inject(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

pub fn create_server(config: LogConfig) -> TestServer {
    create_server_with(config, Arc::new(MockLogger::new()))
}

pub fn create_server_with(config: LogConfig, logger: Arc<MockLogger>) -> TestServer {
    let (hub, plugin) = register(config, logger.clone());
    TestServer {
        server: HttpServer::new(ServerConfig::default(), app(), Arc::new(hub)),
        plugin,
        logger,
    }
}

pub fn register(config: LogConfig, logger: Arc<MockLogger>) -> (EventHub, LogPlugin) {
    let mut hub = EventHub::new();
    let plugin = LogPlugin::register(&mut hub, PluginOptions::new(config).logger(logger));
    (hub, plugin)
}

/// Start on an ephemeral port and shut down right after `start`.
pub async fn start_and_stop(server: HttpServer) -> Result<(), ServerError> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    shutdown.trigger();
    server.run(listener, receiver).await
}

pub fn app() -> Router {
    Router::new()
        .route("/simple", get(simple))
        .route(
            "/route/with/tags",
            get(simple).layer(RouteTags::new(["foo", "bar", "baz"])),
        )
        .route("/handler/that/server/logs/info", get(server_logs_info))
        .route("/handler/that/server/logs/error", get(server_logs_error))
        .route(
            "/handler/that/server/logs/default/level",
            get(server_logs_default_level),
        )
        .route("/handler/that/request/logs/info", get(request_logs_info))
        .route(
            "/handler/that/request/logs/default/level",
            get(request_logs_default_level),
        )
        .route("/handler/that/request/throws", get(request_throws))
        .route("/handler/with/payload", post(with_payload))
}

async fn simple() -> &'static str {
    "success"
}

async fn server_logs_info(server: ServerLog) -> &'static str {
    server.log(["info", "foo"], "server.log() from handler");
    "success"
}

async fn server_logs_error(server: ServerLog) -> &'static str {
    server.log(["info", "error", "debug"], "server.log() from handler");
    "success"
}

async fn server_logs_default_level(server: ServerLog) -> &'static str {
    server.log(["foo"], "server.log() from handler");
    "success"
}

async fn request_logs_info(request: RequestLog) -> &'static str {
    request.log(["info", "foo"], "request.log() from handler");
    "success"
}

async fn request_logs_default_level(request: RequestLog) -> &'static str {
    request.log(["foo"], "request.log() from handler");
    "success"
}

async fn request_throws() -> Result<&'static str, HandlerError> {
    Err(HandlerError::new("oh no!"))
}

async fn with_payload(Json(payload): Json<Value>) -> Json<Value> {
    Json(payload)
}
