//! Per-request execution of the assembled pipeline.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderName, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::config::loader::ConfigError;
use crate::config::schema::SecurityConfig;
use crate::observability::metrics;
use crate::pipeline::step::{assemble, Step, StepKind};
use crate::rate_limit::window::RateLimitDecision;
use crate::sanitize::html::SanitizePolicy;
use crate::sanitize::walk::sanitize_value;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Largest request body the sanitize step will buffer.
const MAX_SANITIZE_BODY: usize = 1024 * 1024;

/// The assembled, immutable middleware chain.
///
/// Built once from a configuration and reused for every request; share it
/// via `Arc`. Two pipelines never share rate-limit state unless they were
/// assembled from the same call.
pub struct SecurityPipeline {
    steps: Vec<Step>,
}

impl SecurityPipeline {
    /// Validate a configuration and assemble its pipeline.
    pub fn assemble(config: &SecurityConfig) -> Result<Self, ConfigError> {
        assemble(config)
    }

    pub(crate) fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The ordered step kinds; ordering is data, so tests can assert it.
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(Step::kind).collect()
    }

    /// Wrap a router with this pipeline.
    pub fn apply_to(self: &Arc<Self>, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(
            Arc::clone(self),
            security_middleware,
        ))
    }

    /// Spawn a background task that periodically drops stale rate-limit
    /// entries. Returns `None` when the pipeline has no rate-limit step.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_eviction_sweeper(&self, every: Duration) -> Option<tokio::task::JoinHandle<()>> {
        let limiter = self.steps.iter().find_map(|step| match step {
            Step::RateLimit(limiter) => Some(Arc::clone(limiter)),
            _ => None,
        })?;

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                limiter.purge_expired(Instant::now());
                tracing::debug!(tracked_keys = limiter.tracked_keys(), "Rate limit sweep");
            }
        }))
    }

    /// Run one request through the chain.
    ///
    /// Request phase walks the steps in order; rate limiting may
    /// short-circuit with 429 before any later step or the handler runs.
    /// Response phase replays header directives (onto rejections too) and
    /// records the audit line once status and latency are known.
    pub async fn handle(&self, client: &str, mut request: Request<Body>, next: Next) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let mut decision: Option<RateLimitDecision> = None;

        let mut response = 'request: {
            for step in &self.steps {
                match step {
                    Step::RateLimit(limiter) => {
                        let outcome = limiter.check(client, Instant::now());
                        let rejected = !outcome.permitted;
                        decision = Some(outcome);
                        if rejected {
                            tracing::warn!(client = %client, path = %path, "Rate limit exceeded");
                            metrics::record_rate_limited();
                            break 'request (
                                StatusCode::TOO_MANY_REQUESTS,
                                "Too many requests, please try again later.",
                            )
                                .into_response();
                        }
                    }
                    Step::SanitizeJson(policy) => {
                        request = match sanitize_json_body(request, policy).await {
                            Ok(request) => request,
                            Err(response) => break 'request response,
                        };
                    }
                    // Header and audit steps act in the response phase.
                    Step::Headers(_) | Step::Cors(_) | Step::AuditLog(_) => {}
                }
            }

            next.run(request).await
        };

        let status = response.status();

        for step in &self.steps {
            match step {
                Step::Headers(directives) | Step::Cors(directives) => {
                    directives.apply(response.headers_mut());
                }
                Step::AuditLog(log) => {
                    log.record(
                        client,
                        method.as_str(),
                        &path,
                        status.as_u16(),
                        start.elapsed(),
                    );
                }
                Step::RateLimit(_) | Step::SanitizeJson(_) => {}
            }
        }

        if let Some(outcome) = decision {
            let headers = response.headers_mut();
            headers.insert(RATELIMIT_LIMIT, outcome.limit.into());
            headers.insert(RATELIMIT_REMAINING, outcome.remaining.into());
            headers.insert(RATELIMIT_RESET, outcome.reset_after.as_secs().into());
        }

        metrics::record_request(method.as_str(), status.as_u16());
        response
    }
}

/// Axum middleware entry point; wire with
/// `middleware::from_fn_with_state(pipeline, security_middleware)` or
/// [`SecurityPipeline::apply_to`].
pub async fn security_middleware(
    State(pipeline): State<Arc<SecurityPipeline>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request);
    pipeline.handle(&client, request, next).await
}

/// Client identity used to bucket rate-limit counters: the peer address
/// when the server provides it, else the first `X-Forwarded-For` hop.
fn client_key(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Buffer and scrub a JSON request body; non-JSON requests pass through
/// untouched. A body nested beyond the depth guard yields 400.
async fn sanitize_json_body(
    request: Request<Body>,
    policy: &SanitizePolicy,
) -> Result<Request<Body>, Response> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Ok(request);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_SANITIZE_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Err(
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response(),
            );
        }
    };

    if bytes.is_empty() {
        return Ok(Request::from_parts(parts, Body::empty()));
    }

    // Malformed JSON is the handler's problem, not the sanitizer's.
    let value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Ok(Request::from_parts(parts, Body::from(bytes))),
    };

    match sanitize_value(&value, policy) {
        Ok(scrubbed) => {
            metrics::record_sanitized_body();
            let bytes = serde_json::to_vec(&scrubbed).unwrap_or_else(|_| bytes.to_vec());
            parts.headers.insert(header::CONTENT_LENGTH, bytes.len().into());
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        Err(error) => {
            tracing::warn!(%error, "Rejecting request body");
            Err((StatusCode::BAD_REQUEST, error.to_string()).into_response())
        }
    }
}
