//! Builds the AWS resource graph of a static website: a private bucket for
//! the content, a CloudFront distribution in front of it, and, when a custom
//! domain is configured, a certificate and a DNS alias for that domain.
//!
//! The graph is rendered to CloudFormation templates along with a small
//! deploy script; nothing here talks to AWS except the optional hosted zone
//! lookup in [`zones::Route53Zones`].

pub mod config;
pub mod deploy_script;
pub mod error;
pub mod exports;
pub mod regions;
pub mod resources;
pub mod template;
pub mod topology;
pub mod zones;

pub use config::SiteSettings;
pub use error::{BuildError, ConfigError, ZoneLookupError};
pub use exports::{ExportValue, Exports};
pub use template::{synthesize, DeployTarget, Synthesized};
pub use topology::{DomainContext, SiteConfiguration, SiteTopology};
pub use zones::{HostedZone, Route53Zones, StaticZones, ZoneLookup};
