use std::future::Future;
use std::net::IpAddr;

use trust_dns_resolver::{
    TokioAsyncResolver,
    error::{ResolveError, ResolveErrorKind},
};

use super::{DnsError, MxRecord};

/// Async DNS lookups needed by the pipeline. "No records" is an empty `Ok`,
/// never an error.
pub trait DnsLookup: Send + Sync + 'static {
    fn mx_records(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, DnsError>> + Send;

    fn txt_records(&self, name: &str)
    -> impl Future<Output = Result<Vec<String>, DnsError>> + Send;

    fn ip_addresses(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<IpAddr>, DnsError>> + Send;
}

/// Resolver configured from the host (`/etc/resolv.conf`).
pub fn system_resolver() -> Result<TokioAsyncResolver, DnsError> {
    TokioAsyncResolver::tokio_from_system_conf().map_err(|err| DnsError::ResolverInit {
        message: err.to_string(),
    })
}

impl DnsLookup for TokioAsyncResolver {
    async fn mx_records(&self, name: &str) -> Result<Vec<MxRecord>, DnsError> {
        match self.mx_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
                .collect()),
            Err(err) if should_treat_as_empty(&err) => Ok(Vec::new()),
            Err(err) => Err(DnsError::lookup(name, err)),
        }
    }

    async fn txt_records(&self, name: &str) -> Result<Vec<String>, DnsError> {
        match self.txt_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|txt| {
                    txt.txt_data()
                        .iter()
                        .map(|piece| String::from_utf8_lossy(piece))
                        .collect::<String>()
                })
                .collect()),
            Err(err) if should_treat_as_empty(&err) => Ok(Vec::new()),
            Err(err) => Err(DnsError::lookup(name, err)),
        }
    }

    async fn ip_addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
        match self.lookup_ip(name).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(err) if should_treat_as_empty(&err) => Ok(Vec::new()),
            Err(err) => Err(DnsError::lookup(name, err)),
        }
    }
}

pub(crate) fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('.');
    idna::domain_to_ascii(trimmed).unwrap_or_else(|_| trimmed.to_ascii_lowercase())
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

pub(crate) fn fqdn(label: &str, domain: &str) -> String {
    format!("{}.{}", label.trim().trim_end_matches('.').to_ascii_lowercase(), domain)
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_exchange_trims_dot_and_lowercases() {
        assert_eq!(normalize_exchange("Mail.EXAMPLE.com."), "mail.example.com");
        assert_eq!(normalize_exchange("."), "");
    }

    #[test]
    fn fqdn_prefixes_label() {
        assert_eq!(fqdn("_dmarc", "example.com"), "_dmarc.example.com");
        assert_eq!(fqdn("Google._domainkey", "example.com"), "google._domainkey.example.com");
    }

    #[test]
    fn normalize_domain_converts_idn() {
        assert_eq!(normalize_domain("Example.COM."), "example.com");
        assert!(normalize_domain("exämple.com").starts_with("xn--"));
    }
}
