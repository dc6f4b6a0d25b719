//! HTTP layer: route handlers, DTOs, the exchange interceptor and router
//! composition.
//!
//! Tool routes live under `/api`; the system routes (`/`, `/health`) sit at
//! the root.

pub mod docs;
pub mod dto;
pub mod handlers;
pub mod interceptor;

use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the complete application router.
///
/// Every route except the global monitor stream passes through
/// [`interceptor::relay_exchange`].
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(handlers::system::routes())
        .merge(handlers::monitor_routes())
        .nest("/api", handlers::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
    };

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            interceptor::relay_exchange,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, BodyDataStream};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use futures_util::StreamExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::GatewayConfig;

    const FRAME_WAIT: Duration = Duration::from_secs(2);
    const QUIET_WAIT: Duration = Duration::from_millis(100);

    fn test_state() -> AppState {
        AppState::from_config(&GatewayConfig::default(), reqwest::Client::new())
    }

    /// Reads `data: ...\n\n` frames off an SSE response body.
    struct SseReader {
        stream: BodyDataStream,
        buffer: String,
    }

    impl SseReader {
        fn new(response: Response) -> Self {
            Self {
                stream: response.into_body().into_data_stream(),
                buffer: String::new(),
            }
        }

        /// Next raw frame, including its `data: ` prefix and blank-line terminator.
        async fn next_frame(&mut self) -> Option<String> {
            loop {
                if let Some(end) = self.buffer.find("\n\n") {
                    let frame: String = self.buffer.drain(..end + 2).collect();
                    return Some(frame);
                }
                let chunk = tokio::time::timeout(FRAME_WAIT, self.stream.next())
                    .await
                    .ok()??
                    .ok()?;
                self.buffer.push_str(&String::from_utf8_lossy(&chunk));
            }
        }

        async fn next_json(&mut self) -> serde_json::Value {
            let Some(frame) = self.next_frame().await else {
                panic!("stream ended before next frame");
            };
            let Some(json) = frame.strip_prefix("data: ") else {
                panic!("unexpected frame: {frame:?}");
            };
            serde_json::from_str(json.trim_end()).unwrap_or_default()
        }

        async fn is_quiet(&mut self) -> bool {
            self.buffer.is_empty()
                && tokio::time::timeout(QUIET_WAIT, self.stream.next())
                    .await
                    .is_err()
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        let Ok(response) = app.clone().oneshot(request).await;
        response
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri)
            .body(Body::empty())
            .unwrap_or_else(|_| panic!("valid request"))
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, json.len())
            .body(Body::from(json.to_string()))
            .unwrap_or_else(|_| panic!("valid request"))
    }

    async fn open_monitor(app: &Router) -> SseReader {
        let response = send(app, get("/api/events")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );
        SseReader::new(response)
    }

    #[tokio::test]
    async fn monitor_sees_ack_then_request_and_response() {
        let state = test_state();
        let app = build_router(state.clone());

        let mut monitor = open_monitor(&app).await;
        assert_eq!(
            monitor.next_frame().await.as_deref(),
            Some("data: {\"type\":\"connection\",\"status\":\"established\"}\n\n")
        );
        assert_eq!(state.event_bus.monitor_count(), 1);

        // No SearXNG configured: the handler answers with a configuration error.
        let response = send(&app, post_json("/api/search/web-search", r#"{"query":"x"}"#)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let request = monitor.next_json().await;
        assert_eq!(request["type"], "request");
        assert_eq!(request["method"], "POST");
        assert_eq!(request["url"], "/api/search/web-search");
        assert_eq!(request["body"], serde_json::json!({"query": "x"}));

        let body = body_string(response).await;
        assert!(body.contains("\"status\":\"error\""));

        let completed = monitor.next_json().await;
        assert_eq!(completed["type"], "response");
        assert_eq!(completed["status"], 500);
        assert_eq!(completed["url"], "/api/search/web-search");
    }

    #[tokio::test]
    async fn keep_alive_comments_follow_the_ack() {
        let config = GatewayConfig {
            sse_keep_alive: Some(Duration::from_millis(50)),
            ..GatewayConfig::default()
        };
        let app = build_router(AppState::from_config(&config, reqwest::Client::new()));

        let mut monitor = open_monitor(&app).await;
        assert_eq!(
            monitor.next_frame().await.as_deref(),
            Some("data: {\"type\":\"connection\",\"status\":\"established\"}\n\n")
        );
        let Some(comment) = monitor.next_frame().await else {
            panic!("no keep-alive frame");
        };
        assert!(comment.starts_with(':'), "unexpected frame: {comment:?}");
    }

    #[tokio::test]
    async fn chunked_json_body_is_reported() {
        let app = build_router(test_state());
        let mut monitor = open_monitor(&app).await;
        let _ack = monitor.next_frame().await;

        let chunks: Vec<Result<&'static str, std::io::Error>> =
            vec![Ok(r#"{"query""#), Ok(r#":"x"}"#)];
        let request = Request::post("/api/search/web-search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap_or_else(|_| panic!("valid request"));
        assert!(request.headers().get(header::CONTENT_LENGTH).is_none());

        // The handler still parses the replayed body: no SearXNG means 500, not 400.
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let event = monitor.next_json().await;
        assert_eq!(event["type"], "request");
        assert_eq!(event["body"], serde_json::json!({"query": "x"}));
    }

    #[tokio::test]
    async fn request_without_body_omits_body_field() {
        let app = build_router(test_state());
        let mut monitor = open_monitor(&app).await;
        let _ack = monitor.next_frame().await;

        let response = send(&app, get("/health?verbose=1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        drop(response);

        let request = monitor.next_json().await;
        assert_eq!(request["url"], "/health?verbose=1");
        assert!(request.get("body").is_none());
        let completed = monitor.next_json().await;
        assert_eq!(completed["status"], 200);
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let app = build_router(test_state());
        let response = send(&app, post_json("/api/search/web-search", r#"{"count":3}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"status":"error","message":"El parámetro 'query' es requerido."}"#
        );
    }

    #[tokio::test]
    async fn search_without_json_content_type_uses_error_envelope() {
        let app = build_router(test_state());
        let request = Request::post("/api/search/web-search")
            .body(Body::from("query=x"))
            .unwrap_or_else(|_| panic!("valid request"));
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"status":"error","message":"El parámetro 'query' es requerido."}"#
        );
    }

    #[tokio::test]
    async fn malformed_search_body_uses_error_envelope() {
        let app = build_router(test_state());
        let response = send(&app, post_json("/api/search/web-search", "{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap_or_default();
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn repeated_webhook_source_uses_first_value() {
        let app = build_router(test_state());
        let mut monitor = open_monitor(&app).await;
        let _ack = monitor.next_frame().await;

        let response = send(&app, post_json("/api/webhook?source=a&source=b", r#"{"n":1}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        drop(response);

        assert_eq!(monitor.next_json().await["type"], "request");
        let event = monitor.next_json().await;
        assert_eq!(event["type"], "webhook_event");
        assert_eq!(event["source"], "a");
    }

    #[tokio::test]
    async fn webhook_without_source_is_rejected_and_not_broadcast() {
        let app = build_router(test_state());
        let mut monitor = open_monitor(&app).await;
        let _ack = monitor.next_frame().await;

        let response = send(&app, post_json("/api/webhook", r#"{"a":1}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"El parámetro \"source\" es requerido en la URL."}"#
        );

        let request = monitor.next_json().await;
        assert_eq!(request["type"], "request");
        let completed = monitor.next_json().await;
        assert_eq!(completed["type"], "response");
        assert_eq!(completed["status"], 400);
        assert!(monitor.is_quiet().await);
    }

    #[tokio::test]
    async fn webhook_with_source_is_broadcast() {
        let app = build_router(test_state());
        let mut first = open_monitor(&app).await;
        let mut second = open_monitor(&app).await;
        let _ = first.next_frame().await;
        let _ = second.next_frame().await;

        let response = send(&app, post_json("/api/webhook?source=crm", r#"{"lead":7}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"status":"success","message":"Webhook event received and broadcasted."}"#
        );

        for monitor in [&mut first, &mut second] {
            assert_eq!(monitor.next_json().await["type"], "request");
            let event = monitor.next_json().await;
            assert_eq!(event["type"], "webhook_event");
            assert_eq!(event["source"], "crm");
            assert_eq!(event["payload"], serde_json::json!({"lead": 7}));
            assert_eq!(monitor.next_json().await["type"], "response");
        }
    }

    #[tokio::test]
    async fn instance_webhook_is_relayed_verbatim() {
        let state = test_state();
        let app = build_router(state.clone());

        let response = send(&app, get("/api/evolution/instances/team1/status-stream")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let mut listener = SseReader::new(response);
        assert_eq!(
            listener.next_frame().await.as_deref(),
            Some("data: {\"status\":\"connected\",\"instanceName\":\"team1\"}\n\n")
        );
        assert_eq!(state.event_bus.instance_keys(), vec!["team1".to_string()]);

        let response = send(
            &app,
            post_json("/api/evolution/webhook", r#"{"instance":"team1","event":"x"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "Webhook received");

        assert_eq!(
            listener.next_frame().await.as_deref(),
            Some("data: {\"instance\":\"team1\",\"event\":\"x\"}\n\n")
        );
    }

    #[tokio::test]
    async fn instance_webhook_without_listener_still_succeeds() {
        let app = build_router(test_state());
        for body in [r#"{"instance":"nobody","event":"x"}"#, r#"{"event":"x"}"#, "garbage"] {
            let response = send(&app, post_json("/api/evolution/webhook", body)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, "Webhook received");
        }
    }

    #[tokio::test]
    async fn resubscribing_moves_delivery_to_new_stream() {
        let state = test_state();
        let app = build_router(state.clone());
        let uri = "/api/evolution/instances/K/status-stream";

        let mut old = SseReader::new(send(&app, get(uri)).await);
        let _ = old.next_frame().await;
        let mut new = SseReader::new(send(&app, get(uri)).await);
        let _ = new.next_frame().await;

        let response = send(&app, post_json("/api/evolution/webhook", r#"{"instance":"K"}"#)).await;
        drop(response);

        assert_eq!(
            new.next_frame().await.as_deref(),
            Some("data: {\"instance\":\"K\"}\n\n")
        );
        assert!(old.is_quiet().await);

        // The superseded stream closing must not evict the new listener.
        drop(old);
        assert_eq!(state.event_bus.instance_keys(), vec!["K".to_string()]);
        drop(new);
        assert!(state.event_bus.instance_keys().is_empty());
    }

    #[tokio::test]
    async fn disconnect_removes_monitor() {
        let state = test_state();
        let app = build_router(state.clone());

        let monitor = open_monitor(&app).await;
        let other = open_monitor(&app).await;
        assert_eq!(state.event_bus.monitor_count(), 2);

        drop(monitor);
        assert_eq!(state.event_bus.monitor_count(), 1);
        drop(other);
        assert_eq!(state.event_bus.monitor_count(), 0);
    }

    #[tokio::test]
    async fn health_reports_open_streams() {
        let app = build_router(test_state());
        let _monitor = open_monitor(&app).await;

        let response = send(&app, get("/health")).await;
        let health: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap_or_default();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["monitor_subscribers"], 1);
    }

    #[tokio::test]
    async fn openapi_lists_relay_routes() {
        let app = build_router(test_state());
        let response = send(&app, get("/api/openapi.json")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap_or_default();
        assert!(doc["paths"].get("/api/events").is_some());
        assert!(doc["paths"].get("/api/webhook").is_some());
        assert!(doc["paths"].get("/api/evolution/webhook").is_some());
    }
}
