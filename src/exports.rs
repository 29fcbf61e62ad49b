use crate::resources::{get_ref, sub, LogicalId, Value};

pub const STORE_NAME: &str = "StoreName";
pub const DISTRIBUTION_ID: &str = "DistributionId";
pub const SITE_URL: &str = "SiteUrl";

/// The value of an export. Most of them are only known once the
/// stack is deployed, so they are kept as references into the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportValue {
    Literal(String),
    Ref(LogicalId),
    /// a `Fn::Sub` string
    Sub(String),
}

impl ExportValue {
    pub fn to_value(&self) -> Value {
        match self {
            ExportValue::Literal(s) => Value::String(s.clone()),
            ExportValue::Ref(id) => get_ref(id),
            ExportValue::Sub(s) => sub(s.as_str()),
        }
    }

    /// every logical id this value refers to
    pub fn references(&self) -> Vec<LogicalId> {
        match self {
            ExportValue::Literal(_) => vec![],
            ExportValue::Ref(id) => vec![id.clone()],
            ExportValue::Sub(s) => {
                let mut out = vec![];
                let mut rest = s.as_str();
                while let Some(start) = rest.find("${") {
                    rest = &rest[start + 2..];
                    let Some(end) = rest.find('}') else { break };
                    let name = rest[..end].split('.').next().unwrap_or_default();
                    out.push(LogicalId::new(name));
                    rest = &rest[end + 1..];
                }
                out
            }
        }
    }
}

/// The named outputs of a site: where the content goes, which distribution
/// to invalidate, and where the site is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exports {
    pub store_name: ExportValue,
    pub distribution_id: ExportValue,
    pub url: ExportValue,
}

impl Exports {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ExportValue)> {
        [
            (STORE_NAME, &self.store_name),
            (DISTRIBUTION_ID, &self.distribution_id),
            (SITE_URL, &self.url),
        ].into_iter()
    }

    pub fn description(name: &str) -> &'static str {
        match name {
            STORE_NAME => "name of the bucket holding the site content",
            DISTRIBUTION_ID => "id of the cloudfront distribution serving the site",
            SITE_URL => "public url of the site",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sub_references_are_extracted() {
        let v = ExportValue::Sub("https://${SiteDistribution.DomainName}/${Other}".into());
        assert_eq!(v.references(), vec![LogicalId::new("SiteDistribution"), LogicalId::new("Other")]);
        assert_eq!(v.to_value(), json!({ "Fn::Sub": "https://${SiteDistribution.DomainName}/${Other}" }));
        assert!(ExportValue::Literal("https://www.example.com".into()).references().is_empty());
    }

    #[test]
    fn exports_iterate_in_fixed_order() {
        let exports = Exports {
            store_name: ExportValue::Ref(LogicalId::new("Bucket")),
            distribution_id: ExportValue::Ref(LogicalId::new("Dist")),
            url: ExportValue::Literal("https://x.example.com".into()),
        };
        let names: Vec<&str> = exports.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec![STORE_NAME, DISTRIBUTION_ID, SITE_URL]);
    }
}
