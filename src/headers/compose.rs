//! Declarative options → concrete header directives.
//!
//! Each directive is a pure function of its option value. `Toggle::Default`
//! emits the documented conservative default, `Toggle::Custom` emits the
//! caller override merged over those defaults, `Toggle::Disabled` emits
//! nothing.

use axum::http::{header, HeaderName};

use crate::config::schema::{
    CoepConfig, CorsConfig, CspConfig, ExpectCtConfig, FrameAction, HstsConfig,
    PermissionsPolicyConfig, ReferrerPolicyConfig, SecurityConfig,
};
use crate::headers::directives::HeaderDirectiveSet;

// Header names the `http` crate has no constants for.
pub const X_DOWNLOAD_OPTIONS: HeaderName = HeaderName::from_static("x-download-options");
pub const X_PERMITTED_CROSS_DOMAIN_POLICIES: HeaderName =
    HeaderName::from_static("x-permitted-cross-domain-policies");
pub const EXPECT_CT: HeaderName = HeaderName::from_static("expect-ct");
pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");

/// Compose the full ordered directive set for a configuration.
///
/// Order is fixed: baseline headers, CORS, opt-in policy headers, then
/// content-type/embedder policies last. Later, more specific options
/// replace baseline entries in place, so no header is emitted twice.
pub fn compose(config: &SecurityConfig) -> HeaderDirectiveSet {
    let mut set = HeaderDirectiveSet::new();
    baseline(config, &mut set);
    cors(config, &mut set);
    policies(config, &mut set);
    set
}

/// The non-CORS directives, in the same relative order as [`compose`].
pub fn compose_security(config: &SecurityConfig) -> HeaderDirectiveSet {
    let mut set = HeaderDirectiveSet::new();
    baseline(config, &mut set);
    policies(config, &mut set);
    set
}

/// The CORS directives only.
pub fn compose_cors(config: &SecurityConfig) -> HeaderDirectiveSet {
    let mut set = HeaderDirectiveSet::new();
    cors(config, &mut set);
    set
}

fn baseline(config: &SecurityConfig, set: &mut HeaderDirectiveSet) {
    if !config.base_headers {
        return;
    }
    set.insert_str(header::X_DNS_PREFETCH_CONTROL, "off");
    set.insert_str(X_DOWNLOAD_OPTIONS, "noopen");
    set.insert_str(X_PERMITTED_CROSS_DOMAIN_POLICIES, "none");
    set.insert_str(header::X_XSS_PROTECTION, "0");
    set.insert_str(header::X_FRAME_OPTIONS, "SAMEORIGIN");
    set.insert_str(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
}

fn cors(config: &SecurityConfig, set: &mut HeaderDirectiveSet) {
    let Some(cors) = config.cors.resolve_with(CorsConfig::default) else {
        return;
    };
    set.insert_str(header::ACCESS_CONTROL_ALLOW_ORIGIN, &cors.allowed_origin);
    set.insert_str(header::ACCESS_CONTROL_ALLOW_METHODS, &cors.allowed_methods);
}

fn policies(config: &SecurityConfig, set: &mut HeaderDirectiveSet) {
    if let Some(csp) = config.csp.resolve_with(CspConfig::default) {
        set.insert_str(header::CONTENT_SECURITY_POLICY, &csp_value(&csp));
    }

    if let Some(action) = config.x_frame_options.resolve_with(FrameAction::default) {
        set.insert_str(header::X_FRAME_OPTIONS, action.as_header_value());
    }

    if let Some(referrer) = config
        .referrer_policy
        .resolve_with(ReferrerPolicyConfig::default)
    {
        set.insert_str(header::REFERRER_POLICY, &referrer.policy);
    }

    if let Some(hsts) = config.hsts.resolve_with(HstsConfig::default) {
        set.insert_str(header::STRICT_TRANSPORT_SECURITY, &hsts_value(&hsts));
    }

    // Content-type and embedder policies come last.
    if config.x_content_type_options {
        set.insert_str(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    }

    if let Some(expect_ct) = config.expect_ct.resolve_with(ExpectCtConfig::default) {
        set.insert_str(EXPECT_CT, &expect_ct_value(&expect_ct));
    }

    if let Some(policy) = config
        .permissions_policy
        .resolve_with(PermissionsPolicyConfig::default)
    {
        if !policy.features.is_empty() {
            set.insert_str(PERMISSIONS_POLICY, &permissions_policy_value(&policy));
        }
    }

    if let Some(coep) = config
        .cross_origin_embedder_policy
        .resolve_with(CoepConfig::default)
    {
        set.insert_str(CROSS_ORIGIN_EMBEDDER_POLICY, &coep.policy);
    }
}

fn csp_value(config: &CspConfig) -> String {
    config
        .directives
        .iter()
        .map(|(name, sources)| {
            if sources.is_empty() {
                name.clone()
            } else {
                format!("{name} {}", sources.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn hsts_value(config: &HstsConfig) -> String {
    let mut value = format!("max-age={}", config.max_age_secs);
    if config.include_subdomains {
        value.push_str("; includeSubDomains");
    }
    if config.preload {
        value.push_str("; preload");
    }
    value
}

fn expect_ct_value(config: &ExpectCtConfig) -> String {
    let mut value = format!("max-age={}", config.max_age_secs);
    if config.enforce {
        value.push_str(", enforce");
    }
    value
}

fn permissions_policy_value(config: &PermissionsPolicyConfig) -> String {
    config
        .features
        .iter()
        .map(|(feature, allow_list)| format!("{feature}=({})", allow_list.join(" ")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Toggle;
    use std::collections::BTreeMap;

    #[test]
    fn default_config_emits_baseline_and_coep() {
        let set = compose(&SecurityConfig::default());

        assert_eq!(set.get(&header::X_DNS_PREFETCH_CONTROL).unwrap(), "off");
        assert_eq!(set.get(&header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
        assert_eq!(set.get(&header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(set.get(&CROSS_ORIGIN_EMBEDDER_POLICY).unwrap(), "require-corp");
        assert!(!set.contains(&header::STRICT_TRANSPORT_SECURITY));
        assert!(!set.contains(&header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn frame_options_override_replaces_baseline_once() {
        let mut config = SecurityConfig::default();
        config.x_frame_options = Toggle::Custom(FrameAction::Deny);

        let set = compose(&config);
        let frame_entries = set
            .iter()
            .filter(|(n, _)| *n == header::X_FRAME_OPTIONS)
            .count();
        assert_eq!(frame_entries, 1);
        assert_eq!(set.get(&header::X_FRAME_OPTIONS).unwrap(), "DENY");
    }

    #[test]
    fn frame_options_absent_when_disabled() {
        let mut config = SecurityConfig::default();
        config.base_headers = false;
        config.x_frame_options = Toggle::Disabled;

        let set = compose(&config);
        assert!(!set.contains(&header::X_FRAME_OPTIONS));
    }

    #[test]
    fn hsts_renders_all_fields() {
        let mut config = SecurityConfig::default();
        config.hsts = Toggle::Custom(HstsConfig {
            max_age_secs: 31_536_000,
            include_subdomains: true,
            preload: false,
        });

        let set = compose(&config);
        let value = set.get(&header::STRICT_TRANSPORT_SECURITY).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.contains("max-age=31536000"));
        assert!(value.contains("includeSubDomains"));
        assert!(!value.contains("preload"));
    }

    #[test]
    fn expect_ct_renders_enforce() {
        let mut config = SecurityConfig::default();
        config.expect_ct = Toggle::Custom(ExpectCtConfig {
            max_age_secs: 30,
            enforce: true,
        });

        let set = compose(&config);
        assert_eq!(set.get(&EXPECT_CT).unwrap(), "max-age=30, enforce");
    }

    #[test]
    fn permissions_policy_renders_allow_lists() {
        let mut features = BTreeMap::new();
        features.insert("geolocation".to_string(), vec!["self".to_string()]);
        features.insert("microphone".to_string(), vec![]);

        let mut config = SecurityConfig::default();
        config.permissions_policy = Toggle::Custom(PermissionsPolicyConfig { features });

        let set = compose(&config);
        let value = set.get(&PERMISSIONS_POLICY).unwrap().to_str().unwrap();
        assert!(value.contains("geolocation=(self)"));
        assert!(value.contains("microphone=()"));
    }

    #[test]
    fn cors_default_is_wildcard() {
        let mut config = SecurityConfig::default();
        config.cors = Toggle::Default;

        let set = compose(&config);
        assert_eq!(set.get(&header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            set.get(&header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET,HEAD,PUT,PATCH,POST,DELETE"
        );
    }

    #[test]
    fn csp_default_directives() {
        let mut config = SecurityConfig::default();
        config.csp = Toggle::Default;

        let set = compose(&config);
        let value = set
            .get(&header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(value.contains("default-src 'self'"));
        assert!(value.contains("img-src 'self' data:"));
    }

    #[test]
    fn ordering_baseline_then_cors_then_policies() {
        let mut config = SecurityConfig::default();
        config.cors = Toggle::Default;
        config.hsts = Toggle::Default;

        let set = compose(&config);
        let names: Vec<_> = set.iter().map(|(n, _)| n.as_str()).collect();
        let dns = names.iter().position(|n| *n == "x-dns-prefetch-control").unwrap();
        let acao = names
            .iter()
            .position(|n| *n == "access-control-allow-origin")
            .unwrap();
        let hsts = names
            .iter()
            .position(|n| *n == "strict-transport-security")
            .unwrap();
        let coep = names
            .iter()
            .position(|n| *n == "cross-origin-embedder-policy")
            .unwrap();
        assert!(dns < acao && acao < hsts && hsts < coep);
    }
}
