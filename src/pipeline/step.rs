//! Build-time assembly of the ordered step list.

use std::sync::Arc;

use crate::audit::{AuditLog, AuditSink, FileSink, NullSink};
use crate::config::loader::ConfigError;
use crate::config::schema::{AuditLogConfig, RateLimitConfig, SecurityConfig};
use crate::config::validation::validate_config;
use crate::headers::compose::{compose_cors, compose_security};
use crate::headers::directives::HeaderDirectiveSet;
use crate::pipeline::service::SecurityPipeline;
use crate::rate_limit::window::FixedWindowLimiter;
use crate::sanitize::html::SanitizePolicy;

/// Discriminant of a pipeline step, used to inspect ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Headers,
    Cors,
    RateLimit,
    AuditLog,
    SanitizeJson,
}

/// One unit of request processing in the assembled chain.
pub enum Step {
    /// Replay security header directives onto the response.
    Headers(HeaderDirectiveSet),
    /// Replay CORS directives onto the response.
    Cors(HeaderDirectiveSet),
    /// Fixed-window check; may short-circuit with 429.
    RateLimit(Arc<FixedWindowLimiter>),
    /// Record one line per request, after the final status is known.
    AuditLog(Arc<AuditLog>),
    /// Scrub JSON request bodies before they reach the handler.
    SanitizeJson(SanitizePolicy),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Headers(_) => StepKind::Headers,
            Step::Cors(_) => StepKind::Cors,
            Step::RateLimit(_) => StepKind::RateLimit,
            Step::AuditLog(_) => StepKind::AuditLog,
            Step::SanitizeJson(_) => StepKind::SanitizeJson,
        }
    }
}

/// Turn a configuration into the ordered step list.
///
/// Validation failures are the only error; assembly of a validated config
/// always succeeds. The step order is fixed — headers, CORS, rate limit,
/// audit log, sanitize — and disabled steps are simply absent.
pub fn assemble(config: &SecurityConfig) -> Result<SecurityPipeline, ConfigError> {
    validate_config(config)?;

    let mut steps = Vec::new();

    let security = compose_security(config);
    if !security.is_empty() {
        steps.push(Step::Headers(security));
    }

    let cors = compose_cors(config);
    if !cors.is_empty() {
        steps.push(Step::Cors(cors));
    }

    if let Some(params) = config.rate_limit.resolve_with(RateLimitConfig::default) {
        steps.push(Step::RateLimit(Arc::new(FixedWindowLimiter::new(
            params.into(),
        ))));
    }

    if let Some(audit) = config.audit_log.resolve_with(AuditLogConfig::default) {
        steps.push(Step::AuditLog(Arc::new(AuditLog::new(open_sink(&audit)))));
    }

    if config.sanitize {
        steps.push(Step::SanitizeJson(SanitizePolicy::default()));
    }

    Ok(SecurityPipeline::from_steps(steps))
}

/// A sink that cannot be opened degrades to a discarding sink; log
/// destination problems never surface to clients.
fn open_sink(config: &AuditLogConfig) -> Box<dyn AuditSink> {
    match FileSink::open(&config.path) {
        Ok(sink) => Box::new(sink),
        Err(error) => {
            tracing::warn!(path = %config.path.display(), %error, "Audit sink unavailable, discarding audit lines");
            Box::new(NullSink)
        }
    }
}
