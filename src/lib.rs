//! Pluggable HTTP hardening layer for Axum services.
//!
//! A single declarative [`SecurityConfig`] selects a set of independent
//! protections and composes them into a deterministic middleware pipeline:
//!
//! ```text
//! SecurityConfig
//!     → config::validation (fail fast on malformed options)
//!     → headers::compose   (ordered response-header directive set)
//!     → pipeline::assemble (ordered step list, built once)
//!
//! Incoming request:
//!     → rate_limit  (fixed-window check, may short-circuit with 429)
//!     → sanitize    (scrub JSON request bodies)
//!     → [downstream handler]
//!     → headers     (replay directive set onto the response)
//!     → audit       (one line per request, rejected requests included)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use palisade::{SecurityConfig, SecurityPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SecurityConfig::default();
//! let pipeline = Arc::new(SecurityPipeline::assemble(&config)?);
//!
//! let app: Router = pipeline.apply_to(Router::new().route("/", get(|| async { "ok" })));
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod headers;
pub mod pipeline;

// Protections with algorithmic content
pub mod rate_limit;
pub mod sanitize;

// Cross-cutting concerns
pub mod audit;
pub mod observability;

pub use config::schema::SecurityConfig;
pub use headers::HeaderDirectiveSet;
pub use pipeline::{security_middleware, SecurityPipeline, StepKind};
pub use rate_limit::{FixedWindowLimiter, RateLimitDecision};
pub use sanitize::{sanitize_value, SanitizePolicy};
