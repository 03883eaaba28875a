use serde::{Deserialize, Serialize};

use crate::classify::{DisposableCheck, FreeCheck, RoleCheck};
use crate::dns::DnsFacts;
use crate::score::{Assessment, Reason, State};
use crate::smtp::ProbeResult;

/// Per-address outcome. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub email: String,
    pub state: State,
    pub score: u8,
    pub reason: Reason,
    pub checks: Checks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_you_mean: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checks {
    pub syntax_valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syntax_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syntax_warnings: Vec<String>,
    pub disposable: DisposableCheck,
    pub role: RoleCheck,
    pub free: FreeCheck,
    /// `None` when no probe ran.
    pub catch_all: Option<ProbeResult>,
    /// `None` when the address never reached DNS.
    pub dns: Option<DnsFacts>,
}

impl VerificationResult {
    pub(crate) fn new(email: &str, assessment: Assessment, checks: Checks) -> Self {
        Self {
            email: email.to_string(),
            state: assessment.state,
            score: assessment.score,
            reason: assessment.reason,
            checks,
            did_you_mean: None,
            duration_ms: 0,
        }
    }

    pub fn is_deliverable(&self) -> bool {
        self.state == State::Deliverable
    }
}
