use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address accepted by [`parse_address`](super::parse_address).
///
/// The local-part keeps its original case; only the domain is lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAddress {
    pub original: String,
    pub local: String,
    pub domain: String,
    pub ascii_domain: String,
    pub composition: LocalComposition,
    pub warnings: Vec<String>,
}

impl ParsedAddress {
    /// `local@domain` with the normalized domain.
    pub fn normalized(&self) -> String {
        format!("{}@{}", self.local, self.domain)
    }
}

/// Character statistics of the local-part, used downstream as risk signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalComposition {
    pub numeric: usize,
    pub alphabetic: usize,
    pub unicode: usize,
    pub has_confusables: bool,
    pub has_diacritics: bool,
    pub has_mixed_scripts: bool,
    pub ascii_fold: Option<String>,
    pub findings: Vec<CompositionFinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionFinding {
    pub codepoint: char,
    pub class: FindingClass,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingClass {
    Confusable,
    Diacritic,
    MixedScript,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid syntax: {}", reasons.join("; "))]
pub struct SyntaxError {
    pub reasons: Vec<String>,
}

impl SyntaxError {
    pub(crate) fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }
}
