//! Observability for the hardening pipeline.
//!
//! # Design Decisions
//! - `tracing` for structured diagnostics; initialization belongs to the
//!   embedding application, never to this library
//! - `metrics` facade counters only; the exporter is the application's
//!   choice

pub mod metrics;
