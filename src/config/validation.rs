//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Validation runs once, before a config is accepted into a pipeline, and
//! returns every violation rather than stopping at the first. A config
//! that passes validation can always be assembled; nothing here is checked
//! again at request time.

use thiserror::Error;

use crate::config::schema::{
    CorsConfig, CspConfig, ExpectCtConfig, HstsConfig, PermissionsPolicyConfig, RateLimitConfig,
    ReferrerPolicyConfig, SecurityConfig, Toggle,
};

/// Referrer-Policy tokens registered for the header.
const REFERRER_POLICIES: &[&str] = &[
    "no-referrer",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
];

/// A single semantic violation in a [`SecurityConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rate_limit.window_ms must be greater than zero")]
    ZeroRateLimitWindow,

    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroRateLimitMax,

    #[error("cors.allowed_origin must not be empty")]
    EmptyCorsOrigin,

    #[error("cors.allowed_methods must not be empty")]
    EmptyCorsMethods,

    #[error("csp.directives must contain at least one directive")]
    EmptyCspDirectives,

    #[error("csp directive names must not be empty")]
    EmptyCspDirectiveName,

    #[error("referrer_policy.policy `{0}` is not a registered policy token")]
    UnknownReferrerPolicy(String),

    #[error("hsts.max_age_secs must be greater than zero")]
    ZeroHstsMaxAge,

    #[error("expect_ct.max_age_secs must be greater than zero")]
    ZeroExpectCtMaxAge,

    #[error("permissions_policy feature names must not be empty")]
    EmptyPermissionsFeature,
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &SecurityConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Toggle::Custom(rate_limit) = &config.rate_limit {
        validate_rate_limit(rate_limit, &mut errors);
    }
    if let Toggle::Custom(cors) = &config.cors {
        validate_cors(cors, &mut errors);
    }
    if let Toggle::Custom(csp) = &config.csp {
        validate_csp(csp, &mut errors);
    }
    if let Toggle::Custom(referrer) = &config.referrer_policy {
        validate_referrer_policy(referrer, &mut errors);
    }
    if let Toggle::Custom(hsts) = &config.hsts {
        validate_hsts(hsts, &mut errors);
    }
    if let Toggle::Custom(expect_ct) = &config.expect_ct {
        validate_expect_ct(expect_ct, &mut errors);
    }
    if let Toggle::Custom(policy) = &config.permissions_policy {
        validate_permissions_policy(policy, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rate_limit(config: &RateLimitConfig, errors: &mut Vec<ValidationError>) {
    if config.window_ms == 0 {
        errors.push(ValidationError::ZeroRateLimitWindow);
    }
    if config.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimitMax);
    }
}

fn validate_cors(config: &CorsConfig, errors: &mut Vec<ValidationError>) {
    if config.allowed_origin.trim().is_empty() {
        errors.push(ValidationError::EmptyCorsOrigin);
    }
    if config.allowed_methods.trim().is_empty() {
        errors.push(ValidationError::EmptyCorsMethods);
    }
}

fn validate_csp(config: &CspConfig, errors: &mut Vec<ValidationError>) {
    if config.directives.is_empty() {
        errors.push(ValidationError::EmptyCspDirectives);
    }
    if config.directives.keys().any(|name| name.trim().is_empty()) {
        errors.push(ValidationError::EmptyCspDirectiveName);
    }
}

fn validate_referrer_policy(config: &ReferrerPolicyConfig, errors: &mut Vec<ValidationError>) {
    if !REFERRER_POLICIES.contains(&config.policy.as_str()) {
        errors.push(ValidationError::UnknownReferrerPolicy(config.policy.clone()));
    }
}

fn validate_hsts(config: &HstsConfig, errors: &mut Vec<ValidationError>) {
    if config.max_age_secs == 0 {
        errors.push(ValidationError::ZeroHstsMaxAge);
    }
}

fn validate_expect_ct(config: &ExpectCtConfig, errors: &mut Vec<ValidationError>) {
    if config.max_age_secs == 0 {
        errors.push(ValidationError::ZeroExpectCtMaxAge);
    }
}

fn validate_permissions_policy(
    config: &PermissionsPolicyConfig,
    errors: &mut Vec<ValidationError>,
) {
    if config.features.keys().any(|name| name.trim().is_empty()) {
        errors.push(ValidationError::EmptyPermissionsFeature);
    }
}
