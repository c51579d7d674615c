//! server-log demo server.
//!
//! Runs an axum application with the logging plugin attached, so every
//! lifecycle and request event shows up as a structured record.
//!
//! ```text
//! server-log --config server-log.toml --bind 127.0.0.1:8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_log::config::{load_config, AppConfig, ConfigWatcher, LoggerKind};
use server_log::http::HandlerError;
use server_log::lifecycle::wait_for_signal;
use server_log::{
    EventHub, HttpServer, JsonLogger, LogPlugin, Logger, PluginOptions, RequestLog, RouteTags,
    ServerLog, Shutdown, StdLogger,
};

#[derive(Parser, Debug)]
#[command(name = "server-log", version, about = "Structured logging demo server")]
struct Cli {
    /// Path to a TOML config file; watched for `log.level` changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Records go to stdout; diagnostics stay on stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server_log=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.server.bind_address,
        logger = ?config.logger,
        level = %config.log.level,
        "Configuration loaded"
    );

    let logger: Arc<dyn Logger> = match config.logger {
        LoggerKind::Std => Arc::new(StdLogger::stdio()),
        LoggerKind::Json => Arc::new(JsonLogger::stdout()),
    };

    let mut hub = EventHub::new();
    let plugin = LogPlugin::register(
        &mut hub,
        PluginOptions::new(config.log.clone())
            .logger(logger)
            .on_error(|err| tracing::error!(error = %err, "Logger backend failed")),
    );

    // Dropping the watcher stops it; keep it for the life of the server.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, mut levels) = ConfigWatcher::new(path, plugin.level());
            let watcher = watcher.run()?;
            let plugin = plugin.clone();
            tokio::spawn(async move {
                while let Some(level) = levels.recv().await {
                    plugin.set_severity(level);
                }
            });
            Some(watcher)
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config.server.clone(), app(), Arc::new(hub));

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn app() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/err", get(fail))
        .route(
            "/internal",
            get(internal).layer(RouteTags::new(["internal"])),
        )
        .route("/echo", post(echo))
}

async fn index(server: ServerLog) -> &'static str {
    server.log(["info", "demo"], "handling /");
    "Success"
}

async fn fail() -> Result<&'static str, HandlerError> {
    Err(HandlerError::new("something went wrong"))
}

async fn internal(request: RequestLog) -> &'static str {
    request.log(["debug"], "tagged route");
    "internal"
}

async fn echo(request: RequestLog, Json(body): Json<Value>) -> Json<Value> {
    request.log(["info", "echo"], json!({ "received": body }));
    Json(body)
}
