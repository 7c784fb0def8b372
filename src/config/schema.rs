//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! hardening layer. All types derive Serde traits for deserialization from
//! config files; every field carries a conservative default so that an
//! empty config still enables the baseline protections.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Tri-state switch for an optional protection.
///
/// Deserializes from `false` (disabled), `true` (enabled with documented
/// defaults), or an override value (enabled, caller fields win over the
/// defaults). Absence is handled by the owning field's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<T> {
    /// Explicitly disabled; the protection emits nothing.
    Disabled,
    /// Enabled with the documented conservative defaults.
    Default,
    /// Enabled with caller-supplied parameters.
    Custom(T),
}

impl<T> Toggle<T> {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Toggle::Disabled)
    }

    /// Resolve to concrete parameters: `None` when disabled, the supplied
    /// defaults for `Default`, the caller value for `Custom`.
    pub fn resolve_with(&self, default: impl FnOnce() -> T) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Toggle::Disabled => None,
            Toggle::Default => Some(default()),
            Toggle::Custom(value) => Some(value.clone()),
        }
    }
}

impl<T> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::Disabled
    }
}

impl<'de, T> Deserialize<'de> for Toggle<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToggleVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ToggleVisitor<T> {
            type Value = Toggle<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or an override value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v { Toggle::Default } else { Toggle::Disabled })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                T::deserialize(de::value::StrDeserializer::new(v)).map(Toggle::Custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                T::deserialize(de::value::MapAccessDeserializer::new(map)).map(Toggle::Custom)
            }
        }

        deserializer.deserialize_any(ToggleVisitor(PhantomData))
    }
}

/// Root configuration for the hardening layer.
///
/// Baseline protections (`base_headers`, `x_content_type_options`,
/// `cross_origin_embedder_policy`) are on unless explicitly disabled;
/// everything else is opt-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Baseline security response headers.
    pub base_headers: bool,

    /// Cross-origin resource sharing.
    pub cors: Toggle<CorsConfig>,

    /// Per-client fixed-window rate limiting.
    pub rate_limit: Toggle<RateLimitConfig>,

    /// Per-request audit log lines to an append-only sink.
    pub audit_log: Toggle<AuditLogConfig>,

    /// Content-Security-Policy.
    pub csp: Toggle<CspConfig>,

    /// Deep sanitization of JSON request bodies.
    pub sanitize: bool,

    /// Referrer-Policy.
    pub referrer_policy: Toggle<ReferrerPolicyConfig>,

    /// X-Frame-Options (`DENY` or `SAMEORIGIN`).
    pub x_frame_options: Toggle<FrameAction>,

    /// Strict-Transport-Security.
    pub hsts: Toggle<HstsConfig>,

    /// X-Content-Type-Options: nosniff.
    pub x_content_type_options: bool,

    /// Expect-CT.
    pub expect_ct: Toggle<ExpectCtConfig>,

    /// Permissions-Policy feature map.
    pub permissions_policy: Toggle<PermissionsPolicyConfig>,

    /// Cross-Origin-Embedder-Policy.
    pub cross_origin_embedder_policy: Toggle<CoepConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            base_headers: true,
            cors: Toggle::Disabled,
            rate_limit: Toggle::Disabled,
            audit_log: Toggle::Disabled,
            csp: Toggle::Disabled,
            sanitize: false,
            referrer_policy: Toggle::Disabled,
            x_frame_options: Toggle::Disabled,
            hsts: Toggle::Disabled,
            x_content_type_options: true,
            expect_ct: Toggle::Disabled,
            permissions_policy: Toggle::Disabled,
            cross_origin_embedder_policy: Toggle::Default,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value for `Access-Control-Allow-Origin`.
    pub allowed_origin: String,

    /// Value for `Access-Control-Allow-Methods`.
    pub allowed_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            allowed_methods: "GET,HEAD,PUT,PATCH,POST,DELETE".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window duration in milliseconds.
    pub window_ms: u64,

    /// Maximum requests per client per window (inclusive).
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 100,
        }
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditLogConfig {
    /// Path of the append-only log file.
    pub path: PathBuf,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/access.log"),
        }
    }
}

/// Content-Security-Policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CspConfig {
    /// Directive name → source list.
    pub directives: BTreeMap<String, Vec<String>>,
}

impl Default for CspConfig {
    fn default() -> Self {
        let mut directives = BTreeMap::new();
        directives.insert("default-src".to_string(), vec!["'self'".to_string()]);
        directives.insert("script-src".to_string(), vec!["'self'".to_string()]);
        directives.insert(
            "style-src".to_string(),
            vec!["'self'".to_string(), "'unsafe-inline'".to_string()],
        );
        directives.insert(
            "img-src".to_string(),
            vec!["'self'".to_string(), "data:".to_string()],
        );
        Self { directives }
    }
}

/// Referrer-Policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferrerPolicyConfig {
    pub policy: String,
}

impl Default for ReferrerPolicyConfig {
    fn default() -> Self {
        Self {
            policy: "no-referrer".to_string(),
        }
    }
}

/// X-Frame-Options action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameAction {
    #[serde(alias = "deny")]
    Deny,
    #[default]
    #[serde(alias = "sameorigin")]
    Sameorigin,
}

impl FrameAction {
    pub fn as_header_value(self) -> &'static str {
        match self {
            FrameAction::Deny => "DENY",
            FrameAction::Sameorigin => "SAMEORIGIN",
        }
    }
}

/// Strict-Transport-Security configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsConfig {
    /// `max-age` in seconds.
    pub max_age_secs: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            // 180 days
            max_age_secs: 60 * 60 * 24 * 180,
            include_subdomains: false,
            preload: false,
        }
    }
}

/// Expect-CT configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExpectCtConfig {
    /// `max-age` in seconds.
    pub max_age_secs: u64,
    pub enforce: bool,
}

impl Default for ExpectCtConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 86_400,
            enforce: true,
        }
    }
}

/// Permissions-Policy configuration: feature name → allow list.
///
/// An empty allow list renders as `feature=()` (denied everywhere).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(transparent)]
pub struct PermissionsPolicyConfig {
    pub features: BTreeMap<String, Vec<String>>,
}

/// Cross-Origin-Embedder-Policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoepConfig {
    pub policy: String,
}

impl Default for CoepConfig {
    fn default() -> Self {
        Self {
            policy: "require-corp".to_string(),
        }
    }
}
