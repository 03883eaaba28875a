use thiserror::Error;

/// DNS failures. [`DomainIntelligence`](super::DomainIntelligence) never
/// propagates these: each one degrades the matching fact to "not present".
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("resolver initialization failed: {message}")]
    ResolverInit { message: String },
    #[error("lookup failed for {name}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("lookup timed out for {name}")]
    Timeout { name: String },
    #[error("lookup failed for {name}: {message}")]
    Other { name: String, message: String },
}

impl DnsError {
    pub(crate) fn lookup(
        name: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            name: name.into(),
            source,
        }
    }
}
