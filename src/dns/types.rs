use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MxRecord {
    pub priority: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(priority: u16, exchange: impl Into<String>) -> Self {
        Self {
            priority,
            exchange: exchange.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpfQualifier {
    Fail,
    SoftFail,
    Neutral,
    Pass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpfFact {
    pub present: bool,
    pub record: Option<String>,
    pub qualifier: Option<SpfQualifier>,
}

impl SpfFact {
    /// `+all` or `?all` lets anyone send on behalf of the domain.
    pub fn is_permissive(&self) -> bool {
        matches!(
            self.qualifier,
            Some(SpfQualifier::Pass | SpfQualifier::Neutral)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmarcPolicy {
    None,
    Quarantine,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcFact {
    pub present: bool,
    pub record: Option<String>,
    pub policy: Option<DmarcPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimFact {
    pub present: bool,
    pub record: Option<String>,
    pub selector_used: Option<String>,
}

/// Everything DNS says about a mail domain. Built once per domain and shared
/// through the cache, so it is cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsFacts {
    pub domain: String,
    pub domain_exists: bool,
    /// Ascending priority.
    pub mx_records: Vec<MxRecord>,
    pub has_mx: bool,
    pub spf: SpfFact,
    pub dmarc: DmarcFact,
    pub dkim: DkimFact,
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_failures: Vec<String>,
    /// The MX lookup errored, so `has_mx == false` and a missing domain are
    /// not authoritative answers.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub existence_unknown: bool,
}

impl DnsFacts {
    /// MX host with the lowest priority value.
    pub fn best_mx(&self) -> Option<&MxRecord> {
        self.mx_records.iter().min_by_key(|record| record.priority)
    }
}
