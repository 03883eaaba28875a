use serde::{Deserialize, Serialize};

use crate::batch::{BatchStats, IssueCount};
use crate::dns::{DkimFact, DmarcFact, MxRecord, SpfFact};
use crate::smtp::{Confidence, ProbeResult};

use super::VerificationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverabilityChecks {
    pub domain_exists: bool,
    pub mx_records: Vec<MxRecord>,
    pub spf_record: SpfFact,
    pub dkim_record: DkimFact,
    pub dmarc_record: DmarcFact,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverabilityReport {
    pub domain: String,
    pub overall_score: u8,
    pub checks: DeliverabilityChecks,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchAllReport {
    pub domain: String,
    pub is_catch_all: bool,
    pub confidence: Confidence,
    pub test_email: Option<String>,
    pub smtp_response: Option<String>,
    pub explanation: String,
    pub implications: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CatchAllReport {
    pub(crate) fn without_probe(domain: &str, explanation: &str) -> Self {
        Self {
            domain: domain.to_string(),
            is_catch_all: false,
            confidence: Confidence::Low,
            test_email: None,
            smtp_response: None,
            explanation: explanation.to_string(),
            implications: vec!["Catch-all status is unknown".to_string()],
            recommendations: Vec::new(),
        }
    }

    pub(crate) fn from_probe(domain: &str, probe: &ProbeResult) -> Self {
        let (explanation, implications, recommendations): (String, Vec<&str>, Vec<&str>) =
            match (probe.is_catch_all, probe.confidence, &probe.error_reason) {
                (_, _, Some(reason)) => (
                    format!("The probe did not complete: {reason}"),
                    vec!["Catch-all status is unknown"],
                    vec!["Retry later or from a host with outbound port 25 open"],
                ),
                (true, Confidence::High, None) => (
                    "The server accepted mail for a random address, so it accepts any recipient"
                        .to_string(),
                    vec![
                        "Individual mailbox existence cannot be confirmed over SMTP",
                        "Invalid addresses may bounce after acceptance",
                    ],
                    vec![
                        "Treat addresses on this domain as risky",
                        "Confirm addresses through engagement before large sends",
                    ],
                ),
                (false, Confidence::High, None) => (
                    "The server rejected a random address, so it validates recipients".to_string(),
                    vec!["Per-address SMTP checks are meaningful for this domain"],
                    vec![],
                ),
                (_, Confidence::Medium, None) => (
                    "The server rejected a random address with a non-standard code".to_string(),
                    vec!["The domain probably validates recipients"],
                    vec!["Verify individual addresses before relying on them"],
                ),
                (_, _, None) => (
                    "The server answered with a policy or temporary error".to_string(),
                    vec!["Catch-all status is unknown"],
                    vec!["Retry later; the server may be rate limiting or greylisting"],
                ),
            };
        Self {
            domain: domain.to_string(),
            is_catch_all: probe.is_catch_all,
            confidence: probe.confidence,
            test_email: Some(probe.test_email.clone()),
            smtp_response: probe.smtp_response.clone(),
            explanation,
            implications: implications.iter().map(|s| s.to_string()).collect(),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHealthReport {
    pub stats: BatchStats,
    pub top_issues: Vec<IssueCount>,
    pub results: Vec<VerificationResult>,
}
