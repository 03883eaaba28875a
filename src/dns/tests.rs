use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use super::testing::StubResolver;
use super::*;
use crate::config::DnsConfig;

fn intelligence(stub: StubResolver) -> DomainIntelligence<StubResolver> {
    DomainIntelligence::new(stub, &DnsConfig::default())
}

#[tokio::test]
async fn collects_all_facts_and_sorts_mx() {
    let stub = StubResolver::new()
        .with_mx(
            "example.com",
            &[(20, "alt1.aspmx.l.google.com."), (10, "aspmx.l.google.com.")],
        )
        .with_txt("example.com", &["v=spf1 include:_spf.google.com ~all"])
        .with_txt("_dmarc.example.com", &["v=DMARC1; p=reject"])
        .with_txt("google._domainkey.example.com", &["v=DKIM1; k=rsa; p=MIIBIjAN"]);

    let facts = intelligence(stub).facts("Example.com").await;
    assert!(facts.domain_exists);
    assert!(facts.has_mx);
    assert_eq!(facts.mx_records[0].priority, 10);
    assert_eq!(facts.best_mx().map(|mx| mx.priority), Some(10));
    assert!(facts.spf.present);
    assert_eq!(facts.dmarc.policy, Some(DmarcPolicy::Reject));
    assert!(facts.dkim.present);
    assert_eq!(facts.dkim.selector_used.as_deref(), Some("google"));
    assert_eq!(facts.provider.as_deref(), Some("Google"));
    assert!(facts.lookup_failures.is_empty());
}

#[tokio::test]
async fn dkim_probe_stops_at_first_selector_with_key() {
    let stub = StubResolver::new()
        .with_mx("example.com", &[(10, "mx.example.com")])
        .with_txt("default._domainkey.example.com", &["v=DKIM1; k=rsa"])
        .with_txt("k1._domainkey.example.com", &["v=DKIM1; p=K1KEY"])
        .with_txt("smtp._domainkey.example.com", &["v=DKIM1; p=SMTPKEY"]);

    let facts = intelligence(stub).facts("example.com").await;
    assert_eq!(facts.dkim.selector_used.as_deref(), Some("k1"));
    assert_eq!(facts.dkim.record.as_deref(), Some("v=DKIM1; p=K1KEY"));
}

#[tokio::test]
async fn failed_lookups_degrade_to_absent() {
    let stub = StubResolver::new()
        .with_mx("example.com", &[(10, "mx.example.com")])
        .failing("_dmarc.example.com");

    let facts = intelligence(stub).facts("example.com").await;
    assert!(facts.has_mx);
    assert!(!facts.dmarc.present);
    assert_eq!(facts.lookup_failures.len(), 1);
}

#[tokio::test]
async fn null_mx_means_no_mail_but_domain_exists() {
    let stub = StubResolver::new().with_mx("nomail.example", &[(0, ".")]);
    let facts = intelligence(stub).facts("nomail.example").await;
    assert!(facts.domain_exists);
    assert!(!facts.has_mx);
    assert!(facts.mx_records.is_empty());
    assert!(facts.best_mx().is_none());
}

#[tokio::test]
async fn servfail_on_mx_leaves_existence_unknown() {
    let stub = StubResolver::new().failing("flaky.example");
    let facts = intelligence(stub).facts("flaky.example").await;
    assert!(!facts.domain_exists);
    assert!(!facts.has_mx);
    assert!(facts.existence_unknown);

    let answered = intelligence(StubResolver::new()).facts("gone.example").await;
    assert!(!answered.existence_unknown);
}

#[tokio::test]
async fn unknown_domain_does_not_exist() {
    let facts = intelligence(StubResolver::new())
        .facts("nonexistent-domain-xyz123.invalid")
        .await;
    assert!(!facts.domain_exists);
    assert!(!facts.has_mx);
    assert!(facts.mx_records.is_empty());
}

#[tokio::test]
async fn a_record_alone_means_domain_exists_without_mx() {
    let stub = StubResolver::new().with_ip("web-only.example", IpAddr::V4(Ipv4Addr::LOCALHOST));
    let facts = intelligence(stub).facts("web-only.example").await;
    assert!(facts.domain_exists);
    assert!(!facts.has_mx);
}

#[tokio::test]
async fn facts_are_cached_per_domain() {
    let stub = StubResolver::new().with_mx("example.com", &[(10, "mx.example.com")]);
    let clock = Arc::new(ManualClock::new());
    let dns = intelligence(stub).with_cache(TtlCache::with_clock(
        Duration::from_secs(60),
        16,
        clock.clone(),
    ));

    dns.facts("example.com").await;
    dns.facts("EXAMPLE.com").await;
    assert_eq!(dns.resolver().mx_calls(), 1);

    clock.advance(Duration::from_secs(61));
    dns.facts("example.com").await;
    assert_eq!(dns.resolver().mx_calls(), 2);
}

#[tokio::test]
async fn slow_lookup_hits_timeout() {
    let stub = StubResolver::new()
        .with_mx("slow.example", &[(10, "mx.slow.example")])
        .with_delay(Duration::from_millis(200));
    let config = DnsConfig {
        lookup_timeout: Duration::from_millis(20),
        ..DnsConfig::default()
    };
    let facts = DomainIntelligence::new(stub, &config)
        .facts("slow.example")
        .await;
    assert!(!facts.has_mx);
    assert!(facts.lookup_failures.iter().any(|f| f.contains("timed out")));
}
