//! DNS intelligence: MX, SPF, DMARC and DKIM facts plus provider fingerprinting.
//!
//! Every lookup is independent and bounded by the configured timeout. A
//! failed lookup only marks its own fact as absent; [`DomainIntelligence::facts`]
//! always returns a [`DnsFacts`].

mod cache;
mod error;
mod provider;
mod records;
mod resolver;
mod types;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use error::DnsError;
pub use provider::fingerprint_provider;
pub use resolver::{DnsLookup, system_resolver};
pub use types::{
    DkimFact, DmarcFact, DmarcPolicy, DnsFacts, MxRecord, SpfFact, SpfQualifier,
};

use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::DnsConfig;
use resolver::{fqdn, normalize_domain};

pub struct DomainIntelligence<R> {
    resolver: R,
    dkim_selectors: Vec<String>,
    lookup_timeout: Duration,
    cache: TtlCache<DnsFacts>,
}

impl<R: DnsLookup> DomainIntelligence<R> {
    pub fn new(resolver: R, config: &DnsConfig) -> Self {
        Self {
            resolver,
            dkim_selectors: config.dkim_selectors.clone(),
            lookup_timeout: config.lookup_timeout,
            cache: TtlCache::new(config.cache_ttl, config.cache_capacity),
        }
    }

    pub fn with_cache(mut self, cache: TtlCache<DnsFacts>) -> Self {
        self.cache = cache;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn cache(&self) -> &TtlCache<DnsFacts> {
        &self.cache
    }

    /// Facts for `domain`, served from the cache when fresh. Results with
    /// lookup failures are not cached.
    #[instrument(skip(self))]
    pub async fn facts(&self, domain: &str) -> DnsFacts {
        let ascii = normalize_domain(domain);
        if let Some(cached) = self.cache.get(&ascii) {
            debug!(domain = %ascii, "dns facts served from cache");
            return cached;
        }

        let facts = self.resolve(&ascii).await;
        if facts.lookup_failures.is_empty() {
            self.cache.insert(&ascii, facts.clone());
        }
        facts
    }

    async fn resolve(&self, ascii: &str) -> DnsFacts {
        let mut failures = Vec::new();
        let dmarc_name = fqdn("_dmarc", ascii);

        let (mx, txt, dmarc_txt, ips) = tokio::join!(
            self.bounded(ascii, self.resolver.mx_records(ascii)),
            self.bounded(ascii, self.resolver.txt_records(ascii)),
            self.bounded(&dmarc_name, self.resolver.txt_records(&dmarc_name)),
            self.bounded(ascii, self.resolver.ip_addresses(ascii)),
        );

        let existence_unknown = mx.is_err();
        let mut mx_records = absent_on_error(mx, &mut failures);
        let mx_answered = !mx_records.is_empty();
        // Null MX (RFC 7505) publishes "." to refuse mail.
        mx_records.retain(|record| !record.exchange.trim_end_matches('.').is_empty());
        mx_records.sort();
        mx_records.dedup();
        let txt = absent_on_error(txt, &mut failures);
        let dmarc_txt = absent_on_error(dmarc_txt, &mut failures);
        let ips = absent_on_error(ips, &mut failures);

        let spf = records::spf_from(&txt);
        let dmarc = records::dmarc_from(&dmarc_txt);

        let mut dkim = DkimFact::default();
        let mut dkim_seen = false;
        for selector in &self.dkim_selectors {
            let name = fqdn(&format!("{selector}._domainkey"), ascii);
            let selector_txt = absent_on_error(
                self.bounded(&name, self.resolver.txt_records(&name)).await,
                &mut failures,
            );
            dkim_seen |= !selector_txt.is_empty();
            if let Some(record) = records::dkim_from(&selector_txt) {
                dkim = DkimFact {
                    present: true,
                    record: Some(record),
                    selector_used: Some(selector.clone()),
                };
                break;
            }
        }

        let domain_exists = mx_answered
            || !txt.is_empty()
            || !dmarc_txt.is_empty()
            || !ips.is_empty()
            || dkim_seen;
        let provider = fingerprint_provider(&mx_records).map(str::to_string);

        debug!(
            domain = %ascii,
            exists = domain_exists,
            mx = mx_records.len(),
            spf = spf.present,
            dmarc = dmarc.present,
            dkim = dkim.present,
            "dns facts resolved"
        );

        DnsFacts {
            domain: ascii.to_string(),
            domain_exists,
            has_mx: !mx_records.is_empty(),
            mx_records,
            spf,
            dmarc,
            dkim,
            provider,
            lookup_failures: failures,
            existence_unknown,
        }
    }

    async fn bounded<T>(
        &self,
        name: &str,
        lookup: impl Future<Output = Result<T, DnsError>>,
    ) -> Result<T, DnsError> {
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(DnsError::Timeout {
                name: name.to_string(),
            }),
        }
    }
}

fn absent_on_error<T: Default>(result: Result<T, DnsError>, failures: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "dns lookup degraded to absent");
            failures.push(err.to_string());
            T::default()
        }
    }
}
