//! Site settings, read from a toml file.
//!
//! ```toml
//! site_name = "acme"
//! domain_name = "example.com"
//! site_sub_domain = "www"
//!
//! [deploy]
//! region = "eu-west-1"
//!
//! [zones]
//! source = "static"
//! hosted_zones = { "example.com" = "Z0123456789" }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::regions::CERTIFICATE_REGION;
use crate::topology::SiteConfiguration;
use crate::zones::StaticZones;

pub const DEFAULT_SUB_DOMAIN: &str = "www";

fn default_sub_domain() -> String {
    DEFAULT_SUB_DOMAIN.to_string()
}

fn default_region() -> String {
    CERTIFICATE_REGION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteSettings {
    pub site_name: String,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default = "default_sub_domain")]
    pub site_sub_domain: String,
    #[serde(default)]
    pub deploy: DeploySettings,
    #[serde(default)]
    pub zones: ZoneSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploySettings {
    #[serde(default = "default_region")]
    pub region: String,
    /// defaults to the site name
    #[serde(default)]
    pub stack_name: Option<String>,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self { region: default_region(), stack_name: None }
    }
}

/// Where hosted zone ids come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneSource {
    /// ask the route53 api
    #[default]
    Route53,
    /// only the zones listed in `hosted_zones`
    Static,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneSettings {
    #[serde(default)]
    pub source: ZoneSource,
    /// domain name -> hosted zone id
    #[serde(default)]
    pub hosted_zones: BTreeMap<String, String>,
}

impl SiteSettings {
    pub fn new<S: Into<String>>(site_name: S) -> Self {
        Self {
            site_name: site_name.into(),
            domain_name: None,
            site_sub_domain: default_sub_domain(),
            deploy: DeploySettings::default(),
            zones: ZoneSettings::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: SiteSettings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_name.trim().is_empty() {
            return Err(ConfigError::MissingSiteName);
        }
        Ok(())
    }

    pub fn site_configuration(&self) -> SiteConfiguration {
        SiteConfiguration {
            site_name: self.site_name.clone(),
            domain_name: self.domain_name.clone().filter(|d| !d.is_empty()),
            site_sub_domain: self.site_sub_domain.clone(),
        }
    }

    pub fn stack_name(&self) -> &str {
        self.deploy.stack_name.as_deref().unwrap_or(&self.site_name)
    }

    pub fn static_zones(&self) -> StaticZones {
        let mut zones = StaticZones::new();
        for (domain, id) in &self.zones.hosted_zones {
            zones.insert(domain, id);
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneLookup;

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = SiteSettings::from_toml_str("site_name = \"acme\"").unwrap();
        assert_eq!(settings, SiteSettings::new("acme"));
        assert_eq!(settings.site_sub_domain, "www");
        assert_eq!(settings.deploy.region, "us-east-1");
        assert_eq!(settings.stack_name(), "acme");
        assert_eq!(settings.zones.source, ZoneSource::Route53);
        assert!(settings.site_configuration().domain_name.is_none());
    }

    #[test]
    fn full_settings_parse() {
        let settings = SiteSettings::from_toml_str(r#"
            site_name = "acme"
            domain_name = "example.com"
            site_sub_domain = "docs"

            [deploy]
            region = "eu-west-1"
            stack_name = "acme-docs"

            [zones]
            source = "static"
            hosted_zones = { "example.com" = "Z0123456789" }
        "#).unwrap();
        assert_eq!(settings.stack_name(), "acme-docs");
        assert_eq!(settings.deploy.region, "eu-west-1");
        assert_eq!(settings.zones.source, ZoneSource::Static);
        let config = settings.site_configuration();
        assert_eq!(config.domain_name.as_deref(), Some("example.com"));
        assert_eq!(config.site_sub_domain, "docs");
        assert_eq!(settings.static_zones().find_zone("example.com").unwrap().id, "Z0123456789");
    }

    #[test]
    fn zone_source_names() {
        let settings = SiteSettings::from_toml_str("site_name = \"a\"\n[zones]\nsource = \"route53\"").unwrap();
        assert_eq!(settings.zones.source, ZoneSource::Route53);
    }

    #[test]
    fn empty_domain_means_no_domain() {
        let settings = SiteSettings::from_toml_str("site_name = \"acme\"\ndomain_name = \"\"").unwrap();
        assert!(settings.site_configuration().domain_name.is_none());
    }

    #[test]
    fn bad_settings_are_rejected() {
        assert!(matches!(SiteSettings::from_toml_str("site_name = \"  \""), Err(ConfigError::MissingSiteName)));
        assert!(matches!(SiteSettings::from_toml_str("site_name = \"a\"\nbucket = \"b\""), Err(ConfigError::Parse(_))));
        assert!(matches!(SiteSettings::from_toml_str("domain_name = \"example.com\""), Err(ConfigError::Parse(_))));
        assert!(matches!(
            SiteSettings::from_toml_str("site_name = \"a\"\n[zones]\nsource = \"dns\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
