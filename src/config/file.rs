//! On-disk TOML layout. Every key is optional and overrides the default.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) dns: DnsSection,
    #[serde(default)]
    pub(crate) smtp: SmtpSection,
    #[serde(default)]
    pub(crate) scoring: ScoringSection,
    #[serde(default)]
    pub(crate) batch: BatchSection,
    pub(crate) disposable_list: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsSection {
    pub(crate) lookup_timeout_ms: Option<u64>,
    pub(crate) dkim_selectors: Option<Vec<String>>,
    pub(crate) cache_ttl_secs: Option<u64>,
    pub(crate) cache_capacity: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpSection {
    pub(crate) enabled: Option<bool>,
    pub(crate) port: Option<u16>,
    pub(crate) helo_domain: Option<String>,
    pub(crate) mail_from: Option<String>,
    pub(crate) connect_timeout_ms: Option<u64>,
    pub(crate) probe_deadline_ms: Option<u64>,
    pub(crate) random_local_len: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScoringSection {
    pub(crate) risky_below: Option<u8>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchSection {
    pub(crate) default_concurrency: Option<usize>,
    pub(crate) max_concurrency: Option<usize>,
    pub(crate) per_address_deadline_ms: Option<u64>,
    pub(crate) list_health_min: Option<usize>,
    pub(crate) list_health_max: Option<usize>,
}
