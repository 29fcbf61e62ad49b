use super::*;

pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; img-src 'self' data:; script-src 'self'; style-src 'self' 'unsafe-inline'; object-src 'none'; frame-ancestors 'none'";

/// two years
pub const HSTS_MAX_AGE_SECS: u64 = 63_072_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDirective {
    ContentSecurityPolicy(&'static str),
    StrictTransportSecurity { max_age_secs: u64, include_subdomains: bool, preload: bool },
    /// X-Content-Type-Options: nosniff
    ContentTypeOptions,
    ReferrerPolicy(&'static str),
    XssProtection { mode_block: bool },
    FrameOptions(&'static str),
}

/// Every site gets the same headers. There is no knob to change them.
pub static SECURITY_HEADERS: [HeaderDirective; 6] = [
    HeaderDirective::ContentSecurityPolicy(CONTENT_SECURITY_POLICY),
    HeaderDirective::StrictTransportSecurity {
        max_age_secs: HSTS_MAX_AGE_SECS,
        include_subdomains: true,
        preload: true,
    },
    HeaderDirective::ContentTypeOptions,
    HeaderDirective::ReferrerPolicy("strict-origin-when-cross-origin"),
    HeaderDirective::XssProtection { mode_block: true },
    HeaderDirective::FrameOptions("DENY"),
];

impl HeaderDirective {
    /// key inside SecurityHeadersConfig
    pub fn config_key(&self) -> &'static str {
        match self {
            HeaderDirective::ContentSecurityPolicy(_) => "ContentSecurityPolicy",
            HeaderDirective::StrictTransportSecurity { .. } => "StrictTransportSecurity",
            HeaderDirective::ContentTypeOptions => "ContentTypeOptions",
            HeaderDirective::ReferrerPolicy(_) => "ReferrerPolicy",
            HeaderDirective::XssProtection { .. } => "XSSProtection",
            HeaderDirective::FrameOptions(_) => "FrameOptions",
        }
    }

    /// all directives override whatever the origin sends
    pub fn config_value(&self) -> Value {
        match *self {
            HeaderDirective::ContentSecurityPolicy(policy) => json!({
                "ContentSecurityPolicy": policy,
                "Override": true,
            }),
            HeaderDirective::StrictTransportSecurity { max_age_secs, include_subdomains, preload } => json!({
                "AccessControlMaxAgeSec": max_age_secs,
                "IncludeSubdomains": include_subdomains,
                "Preload": preload,
                "Override": true,
            }),
            HeaderDirective::ContentTypeOptions => json!({ "Override": true }),
            HeaderDirective::ReferrerPolicy(policy) => json!({
                "ReferrerPolicy": policy,
                "Override": true,
            }),
            HeaderDirective::XssProtection { mode_block } => json!({
                "Protection": true,
                "ModeBlock": mode_block,
                "Override": true,
            }),
            HeaderDirective::FrameOptions(option) => json!({
                "FrameOption": option,
                "Override": true,
            }),
        }
    }
}

pub const MAX_POLICY_NAME_LEN: usize = 128;

/// CloudFront response headers policy carrying [`SECURITY_HEADERS`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPolicy {
    logical_id: LogicalId,
    name: String,
}

impl HeaderPolicy {
    pub fn new(parent_id: &str) -> Self {
        // policy names are unique per account, so they are scoped to the stack
        let mut name = format!("{parent_id}-security-headers");
        truncate_at_char_boundary(&mut name, MAX_POLICY_NAME_LEN);
        Self {
            logical_id: LogicalId::new("SiteSecurityHeaders"),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directives(&self) -> &'static [HeaderDirective] {
        &SECURITY_HEADERS
    }
}

impl CfnResource for HeaderPolicy {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::ResponseHeadersPolicy"
    }
    fn properties(&self) -> Value {
        let mut security = Map::new();
        for directive in self.directives() {
            security.insert(directive.config_key().to_string(), directive.config_value());
        }
        json!({
            "ResponseHeadersPolicyConfig": {
                "Name": self.name,
                "Comment": "security headers for static site responses",
                "SecurityHeadersConfig": security,
            }
        })
    }
}
