//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Json},
    http::{header, Request, Response, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use palisade::{SecurityConfig, SecurityPipeline};

static TRACING: std::sync::Once = std::sync::Once::new();

/// Initialize test tracing once; respects `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Build a small application wrapped in the hardening pipeline.
///
/// Routes: `GET /` returns `ok`; `POST /echo` echoes its JSON body, so
/// tests can observe what the sanitize step forwarded to the handler.
pub fn build_app(config: &SecurityConfig) -> Router {
    init_tracing();
    let pipeline = Arc::new(SecurityPipeline::assemble(config).expect("valid test config"));

    let router = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/echo",
            post(|Json(body): Json<serde_json::Value>| async move { Json(body) }),
        )
        .layer(TraceLayer::new_for_http());

    pipeline.apply_to(router)
}

/// Send a request through the app, attaching a peer address the way a
/// connected server would.
pub async fn send(app: &Router, peer: &str, request: Request<Body>) -> Response<Body> {
    let mut request = request;
    let addr: SocketAddr = format!("{peer}:40000").parse().expect("peer address");
    request.extensions_mut().insert(ConnectInfo(addr));
    app.clone().oneshot(request).await.expect("infallible app")
}

pub async fn get_root(app: &Router, peer: &str) -> Response<Body> {
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("request");
    send(app, peer, request).await
}

pub async fn post_json(app: &Router, peer: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, peer, request).await
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[allow(dead_code)]
pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
