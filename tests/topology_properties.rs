use proptest::prelude::*;
use sitestack::resources::{CfnResource, SECURITY_HEADERS};
use sitestack::{ExportValue, SiteConfiguration, SiteTopology, StaticZones};

fn zones() -> StaticZones {
    StaticZones::new()
        .with_zone("example.com", "Z111")
        .with_zone("example.org", "Z222")
}

fn site_config() -> impl Strategy<Value = SiteConfiguration> {
    (
        "[a-z][a-z0-9]{2,20}",
        prop::option::of(prop::sample::select(vec!["example.com", "example.org"])),
        "[a-z][a-z0-9-]{0,10}[a-z0-9]",
    ).prop_map(|(site_name, domain, sub)| SiteConfiguration {
        site_name,
        domain_name: domain.map(String::from),
        site_sub_domain: sub,
    })
}

proptest! {
    #[test]
    fn every_topology_is_complete_and_locked_down(config in site_config()) {
        let topology = SiteTopology::build(&config, &config.site_name, &zones()).unwrap();
        prop_assert!(topology.dangling_references().is_empty());

        let store = topology.content_store().properties();
        for key in ["BlockPublicAcls", "BlockPublicPolicy", "IgnorePublicAcls", "RestrictPublicBuckets"] {
            prop_assert_eq!(store["PublicAccessBlockConfiguration"][key].as_bool(), Some(true));
        }
        prop_assert_eq!(topology.content_store().deletion_policy(), Some("Delete"));
        prop_assert_eq!(topology.header_policy().directives(), &SECURITY_HEADERS[..]);

        let responses = topology.distribution().error_responses();
        prop_assert_eq!(responses.len(), 2);
        let codes: Vec<u16> = responses.iter().map(|r| r.error_code).collect();
        prop_assert_eq!(codes, vec![403, 404]);
        for r in responses {
            prop_assert_eq!(r.response_code, 200);
            prop_assert_eq!(r.response_page_path, "/index.html");
            prop_assert_eq!(r.error_caching_min_ttl, 0);
        }

        let has_domain = config.domain_name.is_some();
        prop_assert_eq!(topology.certificate().is_some(), has_domain);
        prop_assert_eq!(topology.alias().is_some(), has_domain);
        if let Some(resolved) = topology.resolved_domain() {
            prop_assert_eq!(topology.certificate().map(|c| c.domain_name()), Some(resolved));
            let expected = vec![resolved.to_string()];
            prop_assert_eq!(topology.distribution().domain_names(), expected.as_slice());
            prop_assert_eq!(topology.alias().map(|a| a.name()), Some(resolved));
        } else {
            prop_assert!(topology.distribution().domain_names().is_empty());
        }
        match (&config.domain_name, &topology.exports().url) {
            (Some(domain), ExportValue::Literal(url)) => {
                prop_assert_eq!(url, &format!("https://{}.{}", config.site_sub_domain, domain));
            }
            (None, ExportValue::Sub(url)) => {
                prop_assert_eq!(url.as_str(), "https://${SiteDistribution.DomainName}");
            }
            (domain, url) => prop_assert!(false, "unexpected url {:?} for domain {:?}", url, domain),
        }
    }
}
