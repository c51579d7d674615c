//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Wrap the application router with request id, event and timeout layers
//! - Run pre-start hooks before accepting traffic
//! - Emit `start` once listening and `stop` once drained

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use super::layer::EventLayer;
use crate::config::ServerConfig;
use crate::events::{EventHub, ServerInfo};
use crate::logger::BackendError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("pre-start hook failed: {0}")]
    PreStart(#[from] BackendError),
    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host server around an application router.
pub struct HttpServer {
    router: Router,
    hub: Arc<EventHub>,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, app: Router, hub: Arc<EventHub>) -> Self {
        let router = Self::build_router(&config, app, hub.clone());
        Self {
            router,
            hub,
            config,
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, app: Router, hub: Arc<EventHub>) -> Router {
        app.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(EventLayer::new(hub))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run pre-start hooks, serve until `shutdown` fires, then emit `stop`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        self.hub.pre_start().await?;

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");
        self.hub.emit_start(&ServerInfo {
            uri: format!("http://{addr}"),
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        self.hub.emit_stop();
        tracing::info!("HTTP server stopped");
        served.map_err(ServerError::from)
    }
}
