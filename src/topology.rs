//! The site topology builder. A single ordered pass declares every resource
//! of a static site and wires them together; the optional custom domain
//! decides whether a certificate and an alias record exist at all.

use std::collections::BTreeSet;

use crate::error::BuildError;
use crate::exports::{ExportValue, Exports};
use crate::resources::*;
use crate::zones::{HostedZone, ZoneLookup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfiguration {
    pub site_name: String,
    /// when None, `site_sub_domain` is ignored and the site is only
    /// reachable through the distribution's default domain.
    pub domain_name: Option<String>,
    pub site_sub_domain: String,
}

/// Everything that only exists when the site has a custom domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainContext {
    zone: HostedZone,
    resolved_domain: String,
    certificate: Certificate,
}

impl DomainContext {
    /// Looks up the zone for `domain_name` and requests a certificate for
    /// `<site_sub_domain>.<domain_name>`. A failed lookup is returned as is.
    pub fn resolve(
        domain_name: &str,
        site_sub_domain: &str,
        zones: &dyn ZoneLookup,
    ) -> Result<Self, BuildError> {
        // a fully qualified `example.com.` names the same zone
        let domain_name = domain_name.trim_end_matches('.');
        let resolved_domain = format!("{site_sub_domain}.{domain_name}");
        if let Some(reason) = verify_domain_name(&resolved_domain) {
            return Err(BuildError::InvalidDomain { domain: resolved_domain, reason });
        }
        let zone = zones.find_zone(domain_name)?;
        tracing::debug!(zone_id = %zone.id, zone = %zone.name, %resolved_domain, "resolved hosted zone");
        let certificate = Certificate::new(&resolved_domain, &zone);
        Ok(Self { zone, resolved_domain, certificate })
    }

    pub fn zone(&self) -> &HostedZone {
        &self.zone
    }

    pub fn resolved_domain(&self) -> &str {
        &self.resolved_domain
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }
}

/// Returns a description of the problem if `domain` is not a usable
/// fully qualified host name.
pub fn verify_domain_name(domain: &str) -> Option<String> {
    if domain.len() > 253 {
        return Some("Must be at most 253 characters long".into());
    }
    for label in domain.split('.') {
        if label.is_empty() {
            return Some("Must not contain empty labels, eg: a leading/trailing '.' or an empty subdomain".into());
        }
        if label.len() > 63 {
            return Some(format!("Label {label:?} is longer than 63 characters"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Some(format!("Label {label:?} must contain only letters, numbers, and hyphens"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Some(format!("Label {label:?} must not begin or end with a hyphen"));
        }
    }
    None
}

/// A fully wired site: every resource, the optional domain branch, and the
/// exports. There are no dangling references; see [`SiteTopology::dangling_references`].
#[derive(Debug, Clone, PartialEq)]
pub struct SiteTopology {
    site_name: String,
    access_identity: AccessIdentity,
    content_store: ContentStore,
    access_policy: AccessPolicy,
    cleanup: BucketCleanup,
    domain: Option<DomainContext>,
    header_policy: HeaderPolicy,
    distribution: Distribution,
    alias: Option<AliasBinding>,
    exports: Exports,
}

impl SiteTopology {
    /// Builds the topology of `config` for the deployment unit `parent_id`
    /// (the stack name). Either a complete graph is returned or nothing is.
    pub fn build(
        config: &SiteConfiguration,
        parent_id: &str,
        zones: &dyn ZoneLookup,
    ) -> Result<Self, BuildError> {
        let access_identity = AccessIdentity::new(parent_id);
        let content_store = ContentStore::new(parent_id)?;
        let access_policy = AccessPolicy::new(&content_store, &access_identity);
        let cleanup = BucketCleanup::new(&content_store);
        let store_name = ExportValue::Ref(content_store.logical_id().clone());

        let domain = match &config.domain_name {
            Some(domain_name) => Some(DomainContext::resolve(domain_name, &config.site_sub_domain, zones)?),
            None => {
                if !config.site_sub_domain.is_empty() {
                    tracing::warn!(
                        site_sub_domain = %config.site_sub_domain,
                        "no domain name configured, ignoring site_sub_domain"
                    );
                }
                None
            }
        };

        let header_policy = HeaderPolicy::new(parent_id);
        let distribution = Distribution::new(&content_store, &access_identity, &header_policy, domain.as_ref());
        let distribution_id = ExportValue::Ref(distribution.logical_id().clone());

        let (alias, url) = match &domain {
            Some(ctx) => {
                let alias = AliasBinding::new(ctx.resolved_domain(), ctx.zone(), &distribution);
                (Some(alias), ExportValue::Literal(format!("https://{}", ctx.resolved_domain())))
            }
            None => (None, ExportValue::Sub(distribution.default_url())),
        };

        let topology = Self {
            site_name: config.site_name.clone(),
            access_identity,
            content_store,
            access_policy,
            cleanup,
            domain,
            header_policy,
            distribution,
            alias,
            exports: Exports { store_name, distribution_id, url },
        };
        for resource in topology.resources() {
            tracing::debug!(logical_id = %resource.logical_id(), ty = resource.type_string(), "declared resource");
        }
        tracing::info!(
            parent_id,
            site_name = %topology.site_name,
            custom_domain = topology.resolved_domain().unwrap_or("none"),
            resources = topology.resources().len(),
            "built site topology"
        );
        Ok(topology)
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn access_identity(&self) -> &AccessIdentity {
        &self.access_identity
    }

    pub fn content_store(&self) -> &ContentStore {
        &self.content_store
    }

    pub fn domain(&self) -> Option<&DomainContext> {
        self.domain.as_ref()
    }

    pub fn resolved_domain(&self) -> Option<&str> {
        self.domain.as_ref().map(DomainContext::resolved_domain)
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.domain.as_ref().map(DomainContext::certificate)
    }

    pub fn header_policy(&self) -> &HeaderPolicy {
        &self.header_policy
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn alias(&self) -> Option<&AliasBinding> {
        self.alias.as_ref()
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    /// Every declared resource, in the order they were created.
    /// A resource never appears before something it depends on.
    pub fn resources(&self) -> Vec<&dyn CfnResource> {
        let mut out: Vec<&dyn CfnResource> = vec![
            &self.access_identity,
            &self.content_store,
            &self.access_policy,
        ];
        out.extend(self.cleanup.resources());
        if let Some(cert) = self.certificate() {
            out.push(cert);
        }
        out.push(&self.header_policy);
        out.push(&self.distribution);
        if let Some(alias) = &self.alias {
            out.push(alias);
        }
        out
    }

    /// `(resource, resources it depends on)` for every declared resource
    pub fn dependencies(&self) -> Vec<(&LogicalId, Vec<&LogicalId>)> {
        self.resources().into_iter().map(|r| (r.logical_id(), r.depends_on())).collect()
    }

    /// References, from resources or exports, to logical ids that are not
    /// declared. Always empty for a topology returned by [`SiteTopology::build`].
    pub fn dangling_references(&self) -> Vec<LogicalId> {
        let declared: BTreeSet<&LogicalId> = self.resources().into_iter().map(|r| r.logical_id()).collect();
        let mut out = vec![];
        for (_, deps) in self.dependencies() {
            out.extend(deps.into_iter().filter(|d| !declared.contains(d)).cloned());
        }
        for (_, value) in self.exports.iter() {
            out.extend(value.references().into_iter().filter(|r| !declared.contains(r)));
        }
        out
    }
}
