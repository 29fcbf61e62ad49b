use super::*;
use crate::regions::CLOUDFRONT_HOSTED_ZONE_ID;
use crate::zones::HostedZone;

/// An A record in the site's hosted zone aliasing the distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasBinding {
    logical_id: LogicalId,
    name: String,
    hosted_zone_id: String,
    distribution: LogicalId,
    target: Value,
}

impl AliasBinding {
    pub fn new(name: &str, zone: &HostedZone, distribution: &Distribution) -> Self {
        Self {
            logical_id: LogicalId::new("SiteAliasRecord"),
            name: name.to_string(),
            hosted_zone_id: zone.id.clone(),
            distribution: distribution.logical_id().clone(),
            target: distribution.default_domain(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }
}

impl CfnResource for AliasBinding {
    fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
    fn type_string(&self) -> &'static str {
        "AWS::Route53::RecordSet"
    }
    fn properties(&self) -> Value {
        json!({
            "HostedZoneId": self.hosted_zone_id,
            "Name": self.name,
            "Type": "A",
            "Comment": self.name,
            "AliasTarget": {
                "DNSName": self.target,
                "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
            },
        })
    }
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![&self.distribution]
    }
}
