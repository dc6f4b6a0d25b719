//! Exchange interceptor: mirrors every HTTP exchange onto the monitor stream.
//!
//! A `request` event is broadcast before the handler runs. A `response`
//! event is broadcast once the response body has been fully sent (or dropped
//! because the client went away), so it fires exactly once per exchange and
//! only after any downstream call inside the handler has resolved.
//!
//! Neither the request nor the response is altered. The global monitor
//! stream itself is never intercepted.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, BodyDataStream, Bytes};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::{StreamExt, stream};
use http_body::{Body as HttpBody, Frame, SizeHint};

use crate::app_state::AppState;
use crate::domain::{EventBus, RelayEvent};
use crate::sse::MONITOR_STREAM_PATH;

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
pub async fn relay_exchange(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.uri().path() == MONITOR_STREAM_PATH {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);

    let (parts, body) = request.into_parts();
    let (captured, body) = capture_json_body(&parts.headers, body, state.monitor_body_limit).await;
    state
        .event_bus
        .broadcast_all(&RelayEvent::request(method.as_str(), url.as_str(), captured));

    let response = next.run(Request::from_parts(parts, body)).await;

    let (parts, body) = response.into_parts();
    let completion = ExchangeCompletion {
        bus: state.event_bus.clone(),
        method,
        url,
        status: parts.status.as_u16(),
        started,
    };
    Response::from_parts(parts, Body::new(CompletionBody::new(body, completion)))
}

/// Buffers a JSON body of at most `limit` bytes so it can be reported.
///
/// Returns the parsed body (when non-empty) and a body carrying the exact
/// same bytes for the handler. Chunked bodies without `Content-Length` are
/// read frame by frame. Bodies that are not JSON, or turn out larger than
/// `limit`, are not reported; whatever was already read is replayed ahead of
/// the unread remainder so the handler still sees the full stream.
async fn capture_json_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> (Option<serde_json::Value>, Body) {
    if !is_json(headers) || declared_length(headers).is_some_and(|len| len > limit) {
        return (None, body);
    }

    let mut rest = body.into_data_stream();
    let mut buffered: Vec<Bytes> = Vec::new();
    let mut total = 0_usize;
    while let Some(chunk) = rest.next().await {
        match chunk {
            Ok(chunk) => {
                total = total.saturating_add(chunk.len());
                buffered.push(chunk);
                if total > limit {
                    tracing::debug!(limit, "request body over capture limit, not reported");
                    return (None, replay(buffered, None, rest));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to buffer request body");
                return (None, replay(buffered, Some(err), rest));
            }
        }
    }

    let bytes = Bytes::from(buffered.concat());
    let captured = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .filter(is_non_empty);
    (captured, Body::from(bytes))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
}

/// Rebuilds a request body from the chunks already read, an optional read
/// error, and the unread remainder.
fn replay(buffered: Vec<Bytes>, failure: Option<axum::Error>, rest: BodyDataStream) -> Body {
    let head = buffered.into_iter().map(Ok).chain(failure.map(Err));
    Body::from_stream(stream::iter(head).chain(rest))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn is_non_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Data needed to emit the `response` event.
#[derive(Debug)]
struct ExchangeCompletion {
    bus: EventBus,
    method: String,
    url: String,
    status: u16,
    started: Instant,
}

impl ExchangeCompletion {
    fn emit(self) {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.bus.broadcast_all(&RelayEvent::response(
            self.method,
            self.url,
            self.status,
            duration_ms,
        ));
    }
}

/// Response body wrapper that emits the `response` event when the inner
/// body ends, errors, or is dropped, whichever comes first.
#[derive(Debug)]
struct CompletionBody {
    inner: Body,
    completion: Option<ExchangeCompletion>,
}

impl CompletionBody {
    fn new(inner: Body, completion: ExchangeCompletion) -> Self {
        Self {
            inner,
            completion: Some(completion),
        }
    }

    fn complete(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.emit();
        }
    }
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if matches!(polled, Poll::Ready(None | Some(Err(_)))) {
            this.complete();
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
        self.complete();
    }
}
