use super::*;

/// CloudFront origin access identity. The content bucket only ever
/// grants reads to this identity, so the bucket itself can stay private.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessIdentity {
    logical_id: LogicalId,
    comment: String,
}

impl AccessIdentity {
    pub fn new(parent_id: &str) -> Self {
        Self {
            logical_id: LogicalId::new("SiteOriginAccessIdentity"),
            comment: format!("origin access identity for {parent_id}"),
        }
    }

    /// the canonical user the bucket policy grants access to
    pub fn canonical_user(&self) -> Value {
        get_att(&self.logical_id, "S3CanonicalUserId")
    }

    /// the value cloudfront expects in S3OriginConfig.OriginAccessIdentity
    pub fn origin_access_identity_path(&self) -> Value {
        sub(format!("origin-access-identity/cloudfront/${{{}}}", self.logical_id))
    }
}

impl CfnResource for AccessIdentity {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::CloudFrontOriginAccessIdentity"
    }
    fn properties(&self) -> Value {
        json!({
            "CloudFrontOriginAccessIdentityConfig": {
                "Comment": self.comment,
            }
        })
    }
}
