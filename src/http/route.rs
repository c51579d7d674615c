//! Per-route tags.
//!
//! ```ignore
//! Router::new().route("/metrics", get(metrics).layer(RouteTags::new(["internal"])))
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use super::handle::RequestLog;

/// Layer declaring the tags of the routes it wraps.
#[derive(Debug, Clone)]
pub struct RouteTags {
    tags: Arc<[String]>,
}

impl RouteTags {
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl<S> Layer<S> for RouteTags {
    type Service = TaggedRoute<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TaggedRoute {
            inner,
            tags: self.tags.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaggedRoute<S> {
    inner: S,
    tags: Arc<[String]>,
}

impl<S, B> Service<Request<B>> for TaggedRoute<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        if let Some(log) = request.extensions().get::<RequestLog>() {
            log.request().set_route_tags(self.tags.to_vec());
        }
        self.inner.call(request)
    }
}
