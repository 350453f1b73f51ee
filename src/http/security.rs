//! Security response headers
//!
//! Header values are rendered once from configuration and copied onto every
//! response the gateway produces, error pages and redirects included.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{CspDirective, FeaturePolicyEntry, HostedConfig, SecurityConfig};
use crate::error::StartupError;

const FEATURE_POLICY: HeaderName = HeaderName::from_static("feature-policy");
const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Pre-rendered security headers
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    csp: HeaderValue,
    feature_policy: HeaderValue,
    permissions_policy: HeaderValue,
    hsts: Option<HeaderValue>,
}

impl SecurityHeaders {
    /// Render header values; `hsts` is set only in hosted mode
    pub fn from_config(
        config: &SecurityConfig,
        hsts: Option<&HostedConfig>,
    ) -> Result<Self, StartupError> {
        let hsts = match hsts {
            Some(hosted) => Some(to_header_value(
                "Strict-Transport-Security",
                render_hsts(hosted.hsts_max_age, hosted.hsts_include_subdomains),
            )?),
            None => None,
        };

        Ok(Self {
            csp: to_header_value(
                "Content-Security-Policy",
                render_csp(&config.content_security_policy),
            )?,
            feature_policy: to_header_value(
                "Feature-Policy",
                render_feature_policy(&config.feature_policy),
            )?,
            permissions_policy: to_header_value(
                "Permissions-Policy",
                render_permissions_policy(&config.feature_policy),
            )?,
            hsts,
        })
    }

    /// Attach every security header, replacing any value already present
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(hyper::header::CONTENT_SECURITY_POLICY, self.csp.clone());
        headers.insert(FEATURE_POLICY, self.feature_policy.clone());
        headers.insert(PERMISSIONS_POLICY, self.permissions_policy.clone());
        if let Some(hsts) = &self.hsts {
            headers.insert(hyper::header::STRICT_TRANSPORT_SECURITY, hsts.clone());
        }
    }

    pub const fn hsts(&self) -> Option<&HeaderValue> {
        self.hsts.as_ref()
    }
}

fn to_header_value(header: &'static str, value: String) -> Result<HeaderValue, StartupError> {
    HeaderValue::from_str(&value).map_err(|_| StartupError::InvalidHeader { header, value })
}

/// `directive src src; directive src; ...`
pub fn render_csp(directives: &[CspDirective]) -> String {
    directives
        .iter()
        .map(|d| {
            if d.sources.is_empty() {
                d.directive.clone()
            } else {
                format!("{} {}", d.directive, d.sources.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Legacy `Feature-Policy` syntax, e.g. `geolocation 'none'`
pub fn render_feature_policy(entries: &[FeaturePolicyEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {}", e.feature, e.allow.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Structured-field `Permissions-Policy` syntax, e.g. `geolocation=()`
pub fn render_permissions_policy(entries: &[FeaturePolicyEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let allow: Vec<String> = e
                .allow
                .iter()
                .filter_map(|token| match token.as_str() {
                    "'none'" => None,
                    "'self'" => Some("self".to_string()),
                    "*" => Some("*".to_string()),
                    origin => Some(format!("\"{}\"", origin.trim_matches('\''))),
                })
                .collect();
            if allow.len() == 1 && allow[0] == "*" {
                format!("{}=*", e.feature)
            } else {
                format!("{}=({})", e.feature, allow.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_hsts(max_age: u64, include_subdomains: bool) -> String {
    if include_subdomains {
        format!("max-age={max_age}; includeSubDomains")
    } else {
        format!("max-age={max_age}")
    }
}
