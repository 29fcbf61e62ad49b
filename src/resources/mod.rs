use std::fmt;

pub use serde_json::{json, Map, Value};

mod access_identity;
pub use access_identity::*;
mod s3_bucket;
pub use s3_bucket::*;
mod bucket_cleanup;
pub use bucket_cleanup::*;
mod certificate;
pub use certificate::*;
mod header_policy;
pub use header_policy::*;
mod cloudfront;
pub use cloudfront::*;
mod route53;
pub use route53::*;

/// The name a resource is declared under in a template. Other resources
/// refer to it through `Ref` / `Fn::GetAtt` using this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(String);

impl LogicalId {
    /// logical ids may only contain [A-Za-z0-9], so anything else is dropped.
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        let name: String = name.as_ref().chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single resource declaration in the site graph.
pub trait CfnResource {
    fn logical_id(&self) -> &LogicalId;
    fn type_string(&self) -> &'static str;
    fn properties(&self) -> Value;
    /// every other resource this one references. These are the edges
    /// of the graph; the provisioning engine orders creation by them.
    fn depends_on(&self) -> Vec<&LogicalId> {
        vec![]
    }
    fn deletion_policy(&self) -> Option<&'static str> {
        None
    }
}

/// Cuts `s` to at most `max` bytes without splitting a character.
pub fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

pub fn get_ref(id: &LogicalId) -> Value {
    json!({ "Ref": id.as_str() })
}

pub fn get_att(id: &LogicalId, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id.as_str(), attribute] })
}

pub fn sub<S: Into<String>>(s: S) -> Value {
    json!({ "Fn::Sub": s.into() })
}

/// `arn:aws:s3:::<bucket>/*` for the bucket declared under `bucket`
pub fn bucket_objects_arn(bucket: &LogicalId) -> Value {
    sub(format!("arn:aws:s3:::${{{}}}/*", bucket))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub effect: &'static str,
    pub action: &'static str,
    pub resource: Value,
    /// None for identity policies (eg: inline role policies)
    pub principal: Option<Value>,
}

impl PolicyStatement {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("Effect".to_string(), Value::String(self.effect.to_string()));
        map.insert("Action".to_string(), Value::String(self.action.to_string()));
        map.insert("Resource".to_string(), self.resource.clone());
        if let Some(principal) = &self.principal {
            map.insert("Principal".to_string(), principal.clone());
        }
        Value::Object(map)
    }
}

pub fn create_policy_doc(statements: &[PolicyStatement]) -> Value {
    let statements: Vec<Value> = statements.iter().map(PolicyStatement::to_value).collect();
    json!({
        "Version": "2012-10-17",
        "Statement": statements,
    })
}
