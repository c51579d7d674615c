//! Tower layer raising request events on the hub.
//!
//! # Responsibilities
//! - Snapshot the request head (id, method, path, headers, query, peer)
//! - Run `on_request` extensions before anything else touches the request
//! - Capture the payload, then hand handlers a `RequestLog` and `ServerLog`
//! - Report `HandlerError` failures as request events
//! - Emit the response event once the response body is done, or a
//!   cancelled one if the request future is dropped before a response exists
//!
//! # Design Decisions
//! - Request id comes from `x-request-id` when present, else a UUID v4
//! - Payloads are buffered only when the body reports an exact size up to
//!   `MAX_CAPTURED_PAYLOAD`; larger or streaming bodies pass through untouched
//! - A body read error is replayed to the handler after the frames read so far

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::ConnectInfo;
use axum::http::{header, request::Parts, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::{stream, StreamExt};
use http_body::{Frame, SizeHint};
use serde_json::{Map, Value};
use tower::{Layer, Service};
use uuid::Uuid;

use super::error::HandlerFailure;
use super::handle::{RequestLog, ServerLog};
use super::X_REQUEST_ID;
use crate::clock::now_millis;
use crate::events::{EventHub, Flow, LogEvent, RequestInfo, ResponseInfo};

/// Largest request body copied into the response record.
pub const MAX_CAPTURED_PAYLOAD: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct EventLayer {
    hub: Arc<EventHub>,
}

impl EventLayer {
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self { hub }
    }
}

impl<S> Layer<S> for EventLayer {
    type Service = EventService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EventService {
            inner,
            hub: self.hub.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventService<S> {
    inner: S,
    hub: Arc<EventHub>,
}

impl<S> Service<Request<Body>> for EventService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let hub = self.hub.clone();
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            let info = Arc::new(request_info(&parts));
            let mut pending = PendingResponse::new(hub.clone(), info.clone());

            if let Flow::Respond(status) = hub.run_on_request(&info) {
                let response = StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response();
                return Ok(pending.finish(response));
            }

            let body = capture_payload(&info, &parts.headers, body).await;

            parts
                .extensions
                .insert(RequestLog::new(info.clone(), hub.clone()));
            parts.extensions.insert(ServerLog::new(hub.clone()));

            let response = inner.call(Request::from_parts(parts, body)).await?;

            if let Some(failure) = response.extensions().get::<HandlerFailure>() {
                let event = LogEvent::handler_error(failure.message.clone()).for_request(info.id.clone());
                hub.emit_request_event(&info, &event);
            }

            Ok(pending.finish(response))
        })
    }
}

/// Owns the response event until a response exists; on drop without one
/// the event carries no response.
struct PendingResponse {
    hub: Arc<EventHub>,
    request: Option<Arc<RequestInfo>>,
}

impl PendingResponse {
    fn new(hub: Arc<EventHub>, request: Arc<RequestInfo>) -> Self {
        Self {
            hub,
            request: Some(request),
        }
    }

    /// Hand the event over to the response body.
    fn finish(&mut self, response: Response) -> Response {
        let Some(request) = self.request.take() else {
            return response;
        };

        request.mark_responded(now_millis());
        let info = ResponseInfo::new(response.status().as_u16())
            .with_headers(header_map(response.headers()));
        let completion = Completion {
            hub: self.hub.clone(),
            request,
            response: info,
        };

        response.map(|inner| {
            Body::new(CompletionBody {
                inner,
                completion: Some(completion),
            })
        })
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            request.mark_responded(now_millis());
            tracing::debug!(request_id = %request.id, "Request dropped before a response was produced");
            self.hub.emit_response(&request, None);
        }
    }
}

/// Emits the response event when dropped.
struct Completion {
    hub: Arc<EventHub>,
    request: Arc<RequestInfo>,
    response: ResponseInfo,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.hub.emit_response(&self.request, Some(&self.response));
    }
}

/// Response body that stamps the completion time once the last frame has
/// been produced and emits the response event when it goes away.
struct CompletionBody {
    inner: Body,
    completion: Option<Completion>,
}

impl CompletionBody {
    fn complete(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.request.mark_completed(now_millis());
        }
    }
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(None) => this.complete(),
            Poll::Ready(Some(Ok(_))) if this.inner.is_end_stream() => this.complete(),
            _ => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CompletionBody {
    fn drop(&mut self) {
        // Bodies known to be empty may be dropped without a poll.
        if self.inner.is_end_stream() {
            self.complete();
        }
    }
}

fn request_info(parts: &Parts) -> RequestInfo {
    let id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut info = RequestInfo::new(id, parts.method.as_str(), parts.uri.path())
        .with_headers(header_map(&parts.headers))
        .with_query(query_map(parts.uri.query()));

    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        info = info.with_remote(addr.ip().to_string(), addr.port());
    }

    info
}

/// Buffer a small body into `info`'s payload and return a body carrying
/// the same frames. A read error is passed on to whoever reads the body.
async fn capture_payload(info: &RequestInfo, headers: &HeaderMap, body: Body) -> Body {
    match body.size_hint().exact() {
        Some(len) if len > 0 && len <= MAX_CAPTURED_PAYLOAD => {}
        _ => return body,
    }

    let mut frames = body.into_data_stream();
    let mut chunks = Vec::new();
    while let Some(chunk) = frames.next().await {
        match chunk {
            Ok(bytes) => chunks.push(bytes),
            Err(e) => {
                tracing::debug!(request_id = %info.id, error = %e, "Request body failed while capturing payload");
                let replay = chunks.into_iter().map(Ok).chain(std::iter::once(Err(e)));
                return Body::from_stream(stream::iter(replay));
            }
        }
    }

    let bytes = Bytes::from(chunks.concat());
    info.set_payload(parse_payload(headers, &bytes));
    Body::from(bytes)
}

fn parse_payload(headers: &HeaderMap, bytes: &[u8]) -> Value {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.contains("json") {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return value;
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        return Value::Object(form_map(bytes));
    }

    Value::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Header names to values; repeated headers are joined with ", ".
pub(crate) fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            _ => {
                map.insert(name.as_str().to_string(), Value::from(value));
            }
        }
    }
    map
}

fn query_map(query: Option<&str>) -> Map<String, Value> {
    query.map(|q| form_map(q.as_bytes())).unwrap_or_default()
}

/// Decode `a=1&b=2&b=3`; repeated keys become arrays.
fn form_map(input: &[u8]) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = Value::from(value.into_owned());
        match map.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}
