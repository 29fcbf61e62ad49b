//! Hosted zone lookup. The zone for a custom domain lives outside of the
//! stack, so it has to be found before the topology can be built.

use std::collections::BTreeMap;

use aws_sdk_route53::config::retry::RetryConfig;
use aws_sdk_route53::error::DisplayErrorContext;
use tokio::runtime::Handle;

use crate::error::ZoneLookupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// the zone id without the `/hostedzone/` prefix
    pub id: String,
    /// fully qualified zone name, always ending in `.`
    pub name: String,
}

impl HostedZone {
    pub fn new<S: AsRef<str>, S1: AsRef<str>>(id: S, name: S1) -> Self {
        let id = id.as_ref();
        let id = id.strip_prefix("/hostedzone/").unwrap_or(id).to_string();
        let mut name = name.as_ref().to_ascii_lowercase();
        // hosted zone name must end in .
        if !name.ends_with('.') {
            name.push('.');
        }
        Self { id, name }
    }

    pub fn matches_domain(&self, domain: &str) -> bool {
        self.name.trim_end_matches('.') == domain.trim_end_matches('.').to_ascii_lowercase()
    }
}

/// Finds the hosted zone that serves a domain. Implementations must not
/// retry; a failed lookup aborts the build.
pub trait ZoneLookup {
    fn find_zone(&self, domain: &str) -> Result<HostedZone, ZoneLookupError>;
}

/// Zones known ahead of time, keyed by domain name.
#[derive(Debug, Clone, Default)]
pub struct StaticZones {
    zones: BTreeMap<String, HostedZone>,
}

impl StaticZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone<S: AsRef<str>, S1: AsRef<str>>(mut self, domain: S, zone_id: S1) -> Self {
        self.insert(domain, zone_id);
        self
    }

    pub fn insert<S: AsRef<str>, S1: AsRef<str>>(&mut self, domain: S, zone_id: S1) {
        let zone = HostedZone::new(zone_id, domain);
        self.zones.insert(zone.name.clone(), zone);
    }
}

impl ZoneLookup for StaticZones {
    fn find_zone(&self, domain: &str) -> Result<HostedZone, ZoneLookupError> {
        let key = HostedZone::new("", domain).name;
        self.zones.get(&key).cloned().ok_or_else(|| ZoneLookupError::NotFound { domain: domain.to_string() })
    }
}

/// A zone as listed by route53.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedZone {
    pub id: String,
    pub name: String,
    pub private: bool,
}

/// Picks the public zone named exactly `domain` out of a
/// `ListHostedZonesByName` page.
pub fn pick_public_zone<I>(domain: &str, zones: I) -> Result<HostedZone, ZoneLookupError>
    where I: IntoIterator<Item = ListedZone>
{
    zones.into_iter()
        .filter(|z| !z.private)
        .map(|z| HostedZone::new(z.id, z.name))
        .find(|z| z.matches_domain(domain))
        .ok_or_else(|| ZoneLookupError::NotFound { domain: domain.to_string() })
}

/// Looks up public hosted zones with the route53 api. Credentials and
/// region come from the `SdkConfig` it is created with.
#[derive(Debug, Clone)]
pub struct Route53Zones {
    client: aws_sdk_route53::Client,
    runtime: Handle,
}

impl Route53Zones {
    /// `runtime` drives the sdk calls; [`ZoneLookup::find_zone`] blocks on it,
    /// so it must not be called from inside that runtime.
    pub fn new(config: &aws_config::SdkConfig, runtime: Handle) -> Self {
        // a failed lookup aborts the build, the sdk must not retry it
        let conf = aws_sdk_route53::config::Builder::from(config)
            .retry_config(RetryConfig::disabled())
            .build();
        Self { client: aws_sdk_route53::Client::from_conf(conf), runtime }
    }

    pub async fn lookup(&self, domain: &str) -> Result<HostedZone, ZoneLookupError> {
        tracing::debug!(domain, "looking up hosted zone");
        let out = self.client.list_hosted_zones_by_name()
            .dns_name(domain)
            .max_items(5)
            .send()
            .await
            .map_err(|e| ZoneLookupError::Request {
                domain: domain.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
        let listed = out.hosted_zones().iter().map(|z| ListedZone {
            id: z.id().to_string(),
            name: z.name().to_string(),
            private: z.config().map(|c| c.private_zone()).unwrap_or(false),
        });
        pick_public_zone(domain, listed)
    }
}

impl ZoneLookup for Route53Zones {
    fn find_zone(&self, domain: &str) -> Result<HostedZone, ZoneLookupError> {
        self.runtime.block_on(self.lookup(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(id: &str, name: &str, private: bool) -> ListedZone {
        ListedZone { id: id.into(), name: name.into(), private }
    }

    fn listing() -> Vec<ListedZone> {
        vec![
            listed("/hostedzone/ZPRIVATE", "example.com.", true),
            listed("/hostedzone/Z0123456789", "example.com.", false),
            listed("/hostedzone/ZOTHER", "example.net.", false),
        ]
    }

    #[test]
    fn hosted_zone_normalizes_id_and_name() {
        let zone = HostedZone::new("/hostedzone/Z1", "Example.com");
        assert_eq!(zone.id, "Z1");
        assert_eq!(zone.name, "example.com.");
        assert!(zone.matches_domain("example.com"));
        assert!(zone.matches_domain("example.com."));
        assert!(!zone.matches_domain("www.example.com"));
    }

    #[test]
    fn static_zones_find_by_domain() {
        let zones = StaticZones::new().with_zone("example.com", "Z1");
        assert_eq!(zones.find_zone("example.com.").unwrap().id, "Z1");
        let err = zones.find_zone("nosuch.com").unwrap_err();
        assert!(matches!(err, ZoneLookupError::NotFound { domain } if domain == "nosuch.com"));
    }

    #[test]
    fn picks_public_exact_match() {
        let zone = pick_public_zone("example.com", listing()).unwrap();
        assert_eq!(zone, HostedZone::new("Z0123456789", "example.com."));
    }

    #[test]
    fn private_zone_alone_is_not_found() {
        let err = pick_public_zone("example.com", vec![listed("/hostedzone/ZPRIVATE", "example.com.", true)]).unwrap_err();
        assert!(matches!(err, ZoneLookupError::NotFound { domain } if domain == "example.com"));
    }

    #[test]
    fn listing_without_exact_match_is_not_found() {
        // ListHostedZonesByName returns the zones sorted after the
        // requested name, so a missing zone shows up as a different name.
        let err = pick_public_zone("example.org", listing()).unwrap_err();
        assert!(matches!(err, ZoneLookupError::NotFound { .. }));
        assert!(pick_public_zone("example.com", vec![]).is_err());
    }
}
