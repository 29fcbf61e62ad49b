use super::*;
use crate::topology::DomainContext;

// caching optimized:
// https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/using-managed-cache-policies.html#managed-cache-caching-optimized
pub const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";
pub const MINIMUM_PROTOCOL_VERSION: &str = "TLSv1.2_2021";
pub const DEFAULT_ROOT_OBJECT: &str = "index.html";
pub const ALLOWED_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];
pub const CACHED_METHODS: [&str; 2] = ["GET", "HEAD"];
pub const VIEWER_PROTOCOL_POLICY: &str = "redirect-to-https";

const ORIGIN_ID: &str = "site-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error_code: u16,
    pub response_code: u16,
    pub response_page_path: &'static str,
    pub error_caching_min_ttl: u64,
}

impl ErrorResponse {
    pub fn to_value(&self) -> Value {
        json!({
            "ErrorCode": self.error_code,
            "ResponseCode": self.response_code,
            "ResponsePagePath": self.response_page_path,
            "ErrorCachingMinTTL": self.error_caching_min_ttl,
        })
    }
}

/// Missing objects are served as the app shell so client side routing works.
/// The rewrites are never cached, so a fixed deploy shows up immediately.
pub static ERROR_RESPONSES: [ErrorResponse; 2] = [
    ErrorResponse { error_code: 403, response_code: 200, response_page_path: "/index.html", error_caching_min_ttl: 0 },
    ErrorResponse { error_code: 404, response_code: 200, response_page_path: "/index.html", error_caching_min_ttl: 0 },
];

/// The CDN distribution in front of the content bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    logical_id: LogicalId,
    bucket: LogicalId,
    bucket_domain_name: Value,
    identity: LogicalId,
    origin_access_identity: Value,
    header_policy: LogicalId,
    domain_names: Vec<String>,
    certificate: Option<LogicalId>,
}

impl Distribution {
    pub fn new(
        store: &ContentStore,
        identity: &AccessIdentity,
        header_policy: &HeaderPolicy,
        domain: Option<&DomainContext>,
    ) -> Self {
        let (domain_names, certificate) = match domain {
            Some(ctx) => (vec![ctx.resolved_domain().to_string()], Some(ctx.certificate().logical_id().clone())),
            None => (vec![], None),
        };
        Self {
            logical_id: LogicalId::new("SiteDistribution"),
            bucket: store.logical_id().clone(),
            bucket_domain_name: store.regional_domain_name(),
            identity: identity.logical_id().clone(),
            origin_access_identity: identity.origin_access_identity_path(),
            header_policy: header_policy.logical_id().clone(),
            domain_names,
            certificate,
        }
    }

    pub fn domain_names(&self) -> &[String] {
        &self.domain_names
    }

    pub fn certificate(&self) -> Option<&LogicalId> {
        self.certificate.as_ref()
    }

    pub fn error_responses(&self) -> &'static [ErrorResponse] {
        &ERROR_RESPONSES
    }

    /// the `*.cloudfront.net` endpoint
    pub fn default_domain(&self) -> Value {
        get_att(&self.logical_id, "DomainName")
    }

    /// `https://` plus the default domain, as a `Fn::Sub` string
    pub fn default_url(&self) -> String {
        format!("https://${{{}.DomainName}}", self.logical_id)
    }

    fn viewer_certificate(&self) -> Value {
        match &self.certificate {
            // Ref on a certificate, or on a parameter carrying its arn, yields the arn
            Some(cert) => json!({
                "AcmCertificateArn": get_ref(cert),
                "MinimumProtocolVersion": MINIMUM_PROTOCOL_VERSION,
                "SslSupportMethod": "sni-only",
            }),
            None => json!({ "CloudFrontDefaultCertificate": true }),
        }
    }
}

impl CfnResource for Distribution {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }
    fn properties(&self) -> Value {
        let error_responses: Vec<Value> = self.error_responses().iter().map(ErrorResponse::to_value).collect();
        let mut config = json!({
            "Enabled": true,
            "Comment": format!("static site served from {}", self.bucket),
            "DefaultRootObject": DEFAULT_ROOT_OBJECT,
            "HttpVersion": "http2",
            "Origins": [{
                "Id": ORIGIN_ID,
                "DomainName": self.bucket_domain_name,
                "S3OriginConfig": {
                    "OriginAccessIdentity": self.origin_access_identity,
                },
            }],
            "DefaultCacheBehavior": {
                "TargetOriginId": ORIGIN_ID,
                "Compress": true,
                "AllowedMethods": ALLOWED_METHODS,
                "CachedMethods": CACHED_METHODS,
                "ViewerProtocolPolicy": VIEWER_PROTOCOL_POLICY,
                "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
                "ResponseHeadersPolicyId": get_ref(&self.header_policy),
            },
            "CustomErrorResponses": error_responses,
            "ViewerCertificate": self.viewer_certificate(),
        });
        if !self.domain_names.is_empty() {
            config["Aliases"] = json!(self.domain_names);
        }
        json!({ "DistributionConfig": config })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        let mut out = vec![&self.bucket, &self.identity, &self.header_policy];
        if let Some(cert) = &self.certificate {
            out.push(cert);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_distribution() -> Distribution {
        let store = ContentStore::new("acme").unwrap();
        let identity = AccessIdentity::new("acme");
        let headers = HeaderPolicy::new("acme");
        Distribution::new(&store, &identity, &headers, None)
    }

    #[test]
    fn default_behavior_is_read_only_and_https() {
        let props = plain_distribution().properties();
        let behavior = &props["DistributionConfig"]["DefaultCacheBehavior"];
        assert_eq!(behavior["AllowedMethods"], json!(["GET", "HEAD", "OPTIONS"]));
        assert_eq!(behavior["CachedMethods"], json!(["GET", "HEAD"]));
        assert_eq!(behavior["ViewerProtocolPolicy"], "redirect-to-https");
        assert_eq!(behavior["Compress"], true);
        assert_eq!(behavior["CachePolicyId"], CACHING_OPTIMIZED_POLICY_ID);
        assert_eq!(behavior["ResponseHeadersPolicyId"], json!({ "Ref": "SiteSecurityHeaders" }));
    }

    #[test]
    fn origin_goes_through_access_identity() {
        let props = plain_distribution().properties();
        let origin = &props["DistributionConfig"]["Origins"][0];
        assert_eq!(origin["DomainName"], json!({ "Fn::GetAtt": ["SiteContentBucket", "RegionalDomainName"] }));
        assert_eq!(
            origin["S3OriginConfig"]["OriginAccessIdentity"],
            json!({ "Fn::Sub": "origin-access-identity/cloudfront/${SiteOriginAccessIdentity}" })
        );
    }

    #[test]
    fn without_domain_uses_default_certificate_and_no_aliases() {
        let distribution = plain_distribution();
        let props = distribution.properties();
        let config = &props["DistributionConfig"];
        assert!(config.get("Aliases").is_none());
        assert_eq!(config["ViewerCertificate"], json!({ "CloudFrontDefaultCertificate": true }));
        assert!(distribution.certificate().is_none());
        assert_eq!(distribution.depends_on().len(), 3);
    }

    #[test]
    fn default_domain_and_url_point_at_the_same_attribute() {
        let distribution = plain_distribution();
        assert_eq!(distribution.default_domain(), json!({ "Fn::GetAtt": ["SiteDistribution", "DomainName"] }));
        assert_eq!(distribution.default_url(), "https://${SiteDistribution.DomainName}");
    }

    #[test]
    fn error_responses_rewrite_to_index() {
        let props = plain_distribution().properties();
        let errors = props["DistributionConfig"]["CustomErrorResponses"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["ErrorCode"], 403);
        assert_eq!(errors[1]["ErrorCode"], 404);
        for e in errors {
            assert_eq!(e["ResponseCode"], 200);
            assert_eq!(e["ResponsePagePath"], "/index.html");
            assert_eq!(e["ErrorCachingMinTTL"], 0);
        }
        assert_eq!(props["DistributionConfig"]["DefaultRootObject"], "index.html");
    }
}
