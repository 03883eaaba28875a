use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// Why a probe ended without an RCPT verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    /// The probe deadline fired first.
    Timeout,
    /// MX host did not resolve, refused the connection or dropped it.
    Unreachable,
    /// The server answered but rejected the session before RCPT TO.
    Refused,
}

/// Outcome of a catch-all probe against one MX host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub is_catch_all: bool,
    pub confidence: Confidence,
    /// Final RCPT reply, or the failure description when there is none.
    pub smtp_response: Option<String>,
    pub error_reason: Option<String>,
    pub failure: Option<ProbeFailure>,
    pub test_email: String,
    pub mx_host: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<String>,
}

impl ProbeResult {
    pub fn failed(
        failure: ProbeFailure,
        reason: impl Into<String>,
        test_email: impl Into<String>,
        mx_host: Option<String>,
    ) -> Self {
        let reason = reason.into();
        Self {
            is_catch_all: false,
            confidence: Confidence::Low,
            smtp_response: Some(reason.clone()),
            error_reason: Some(reason),
            failure: Some(failure),
            test_email: test_email.into(),
            mx_host,
            transcript: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Either a failure or a reply too ambiguous to act on.
    pub fn is_inconclusive(&self) -> bool {
        self.is_failure() || self.confidence == Confidence::Low
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn new(code: u16, line: impl Into<String>) -> Self {
        Self {
            code,
            lines: vec![line.into()],
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// Code plus the last text line, e.g. `550 5.1.1 no such user`.
    pub fn summary(&self) -> String {
        match self.lines.last().map(|line| line.trim()) {
            Some(text) if !text.is_empty() => format!("{} {}", self.code, text),
            _ => self.code.to_string(),
        }
    }
}
