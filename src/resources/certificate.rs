use super::*;
use crate::regions::CERTIFICATE_REGION;
use crate::zones::HostedZone;

/// A DNS validated ACM certificate for the site domain. The validation
/// records are created in the hosted zone the domain was resolved to.
/// This only works if the hosted zone resides in the deploying account.
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    logical_id: LogicalId,
    domain_name: String,
    hosted_zone_id: String,
}

impl Certificate {
    pub fn new(domain_name: &str, zone: &HostedZone) -> Self {
        Self {
            logical_id: LogicalId::new("SiteCertificate"),
            domain_name: domain_name.to_string(),
            hosted_zone_id: zone.id.clone(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// always us-east-1, regardless of where the site stack is deployed
    pub fn region(&self) -> &'static str {
        CERTIFICATE_REGION
    }
}

impl CfnResource for Certificate {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::CertificateManager::Certificate"
    }
    fn properties(&self) -> Value {
        json!({
            "DomainName": self.domain_name,
            "ValidationMethod": "DNS",
            "DomainValidationOptions": [{
                "DomainName": self.domain_name,
                "HostedZoneId": self.hosted_zone_id,
            }],
        })
    }
}
