//! Structural input sanitization subsystem.
//!
//! # Data Flow
//! ```text
//! JSON request body
//!     → walk.rs (tagged-variant tree walk, depth-guarded)
//!     → html.rs (allow-list filter on every text leaf)
//!     → scrubbed value of identical shape
//! ```
//!
//! # Design Decisions
//! - Pure transform: a new tree of the same shape, never in-place mutation
//! - Conservative allow-list: no tags or attributes permitted by default
//! - Deletion-only rewriting iterated to a fixpoint, so split-tag and
//!   nested-scheme smuggling cannot survive a single pass
//! - Recursion depth is bounded; exceeding it is a defined error instead
//!   of an unbounded-recursion crash

pub mod html;
pub mod walk;

pub use html::{scrub_text, SanitizePolicy};
pub use walk::{sanitize_optional, sanitize_value, SanitizeError, MAX_DEPTH};
