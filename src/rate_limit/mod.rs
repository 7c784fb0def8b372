//! Fixed-window rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → client key (peer address)
//!     → window.rs (snapshot-then-increment of the per-key counter)
//!     → RateLimitDecision { permit | reject, metadata }
//!     → pipeline short-circuits with 429 on reject
//! ```
//!
//! # Design Decisions
//! - Fixed window: the counter resets at fixed intervals, not a sliding one
//! - The store is an explicitly owned value shared via `Arc`; two pipelines
//!   never share counters unless they share the same limiter
//! - Per-key access serializes on the map entry, so concurrent requests
//!   from one client never lose an increment
//! - Stale entries are reclaimed by a periodic purge

pub mod window;

pub use window::{FixedWindowLimiter, RateLimitDecision, RateLimitParams};
