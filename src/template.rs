//! Renders a [`SiteTopology`] into CloudFormation templates.
//!
//! A site with a custom domain is split into two stacks: the certificate
//! has to live in us-east-1 for CloudFront to use it, while the rest of the
//! site is deployed to whatever region was requested. The site stack then
//! receives the certificate arn as a parameter named after the certificate's
//! logical id, so `Ref` resolves to the arn in both cases.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::BuildError;
use crate::exports::Exports;
use crate::regions::{verify_region, CERTIFICATE_REGION};
use crate::resources::{CfnResource, Value};
use crate::topology::SiteTopology;

pub const TEMPLATE_VERSION: &str = "2010-09-09";
/// output key of the certificate stack holding the certificate arn
pub const CERTIFICATE_ARN_OUTPUT: &str = "CertificateArn";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResource {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

impl SavedResource {
    pub fn from_resource(resource: &dyn CfnResource) -> Self {
        let policy = resource.deletion_policy().map(String::from);
        Self {
            ty: resource.type_string().to_string(),
            properties: resource.properties(),
            deletion_policy: policy.clone(),
            update_replace_policy: policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportName {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceOutput {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
    #[serde(rename = "Export", skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub version: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, SavedResource>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, ResourceOutput>,
}

impl Template {
    pub fn new<S: Into<String>>(description: S) -> Self {
        Self {
            version: TEMPLATE_VERSION.to_string(),
            description: description.into(),
            parameters: Default::default(),
            resources: Default::default(),
            outputs: Default::default(),
        }
    }

    pub fn add_resource(&mut self, resource: &dyn CfnResource) {
        self.resources.insert(resource.logical_id().to_string(), SavedResource::from_resource(resource));
    }
}

/// Where a site gets deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub stack_name: String,
    pub region: String,
}

impl DeployTarget {
    pub fn new<S: AsRef<str>, S1: AsRef<str>>(stack_name: S, region: S1) -> Result<Self, BuildError> {
        let stack_name = validate_stack_name(stack_name.as_ref())?;
        if let Some(e) = verify_region(region.as_ref()) {
            return Err(BuildError::InvalidRegion(e));
        }
        Ok(Self { stack_name, region: region.as_ref().to_string() })
    }

    pub fn certificate_stack_name(&self) -> String {
        let mut name = format!("{}-certificate", self.stack_name);
        crate::resources::truncate_at_char_boundary(&mut name, 128);
        name
    }
}

/// A stack name can contain only alphanumeric characters (case sensitive) and hyphens.
/// It must start with an alphabetical character and can't be longer than 128 characters.
/// Underscores are converted to hyphens first.
pub fn validate_stack_name(name: &str) -> Result<String, BuildError> {
    let stack_name = name.replace('_', "-");
    let invalid = || BuildError::InvalidStackName { name: stack_name.clone() };
    if stack_name.is_empty() || stack_name.len() > 128 {
        return Err(invalid());
    }
    for (i, c) in stack_name.chars().enumerate() {
        if i == 0 && !c.is_ascii_alphabetic() {
            return Err(invalid());
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(invalid());
        }
    }
    Ok(stack_name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackTemplate {
    pub stack_name: String,
    pub region: String,
    pub template: Template,
}

impl StackTemplate {
    /// we make it pretty so if a user needs to look at the stack in Cfn console, it looks nice
    pub fn to_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(&self.template)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    /// only present when the site has a custom domain
    pub certificate: Option<StackTemplate>,
    pub site: StackTemplate,
}

fn export_outputs(stack_name: &str, exports: &Exports) -> BTreeMap<String, ResourceOutput> {
    exports.iter()
        .map(|(name, value)| {
            let output = ResourceOutput {
                description: Exports::description(name).to_string(),
                value: value.to_value(),
                export: Some(ExportName { name: format!("{stack_name}-{name}") }),
            };
            (name.to_string(), output)
        })
        .collect()
}

pub fn synthesize(topology: &SiteTopology, target: &DeployTarget) -> Synthesized {
    let certificate = topology.certificate();
    let certificate_stack = certificate.map(|cert| {
        let mut template = Template::new(format!("TLS certificate for {}", cert.domain_name()));
        template.add_resource(cert);
        template.outputs.insert(CERTIFICATE_ARN_OUTPUT.to_string(), ResourceOutput {
            description: format!("arn of the certificate for {}", cert.domain_name()),
            value: crate::resources::get_ref(cert.logical_id()),
            export: None,
        });
        StackTemplate {
            stack_name: target.certificate_stack_name(),
            region: cert.region().to_string(),
            template,
        }
    });

    let mut template = Template::new(format!("static site {}", topology.site_name()));
    for resource in topology.resources() {
        let is_certificate = certificate.map(|c| c.logical_id() == resource.logical_id()).unwrap_or(false);
        if is_certificate {
            continue;
        }
        template.add_resource(resource);
    }
    if let Some(cert) = certificate {
        template.parameters.insert(cert.logical_id().to_string(), Parameter {
            ty: "String".into(),
            description: format!("arn of the {CERTIFICATE_REGION} certificate for {}", cert.domain_name()),
        });
    }
    template.outputs = export_outputs(&target.stack_name, topology.exports());

    tracing::info!(
        stack = %target.stack_name,
        region = %target.region,
        resources = template.resources.len(),
        certificate_stack = certificate_stack.is_some(),
        "synthesized templates"
    );
    Synthesized {
        certificate: certificate_stack,
        site: StackTemplate {
            stack_name: target.stack_name.clone(),
            region: target.region.clone(),
            template,
        },
    }
}
