//! Pipeline assembly subsystem.
//!
//! # Data Flow
//! ```text
//! SecurityConfig
//!     → step.rs (validate, compose headers, build limiter and audit log,
//!                produce the ordered step list once)
//!     → SecurityPipeline (immutable, reused for every request)
//!     → service.rs (axum middleware walking the steps per request)
//! ```
//!
//! # Design Decisions
//! - Steps are tagged variants assembled at build time, not closures
//!   appended per request; ordering is data and independently testable
//! - Fixed order: headers, CORS, rate limit, audit log, sanitize; a
//!   disabled step is absent without disturbing the rest
//! - Assembly fails only on validation errors; request handling never
//!   re-checks configuration

pub mod service;
pub mod step;

pub use service::{security_middleware, SecurityPipeline};
pub use step::{assemble, Step, StepKind};
