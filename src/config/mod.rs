//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or in-code construction
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SecurityConfig (validated, immutable)
//!     → consumed by headers::compose and pipeline::assemble
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a new pipeline
//! - All fields have defaults so a minimal config enables the baseline
//! - Validation separates syntactic (serde) from semantic checks
//! - Options with parameters are a tri-state [`schema::Toggle`]:
//!   explicitly disabled, enabled with conservative defaults, or enabled
//!   with caller overrides

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{SecurityConfig, Toggle};
pub use validation::{validate_config, ValidationError};
