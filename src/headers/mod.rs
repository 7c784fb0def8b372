//! Header policy composition subsystem.
//!
//! # Data Flow
//! ```text
//! SecurityConfig
//!     → compose.rs (one directive per active option, fixed order)
//!     → HeaderDirectiveSet (ordered, deduplicated, immutable)
//!     → replayed onto every response by the pipeline
//! ```
//!
//! # Design Decisions
//! - Composition order is fixed: baseline headers, CORS, opt-in policy
//!   headers, content-type/embedder policies last
//! - Inserting an existing header name replaces it in place, so no header
//!   is ever emitted twice and overrides merge deterministically
//! - A header value that cannot be encoded is skipped with a warning; a
//!   misconfigured optional header is absent, never a request failure

pub mod compose;
pub mod directives;

pub use compose::{compose, compose_cors, compose_security};
pub use directives::HeaderDirectiveSet;
