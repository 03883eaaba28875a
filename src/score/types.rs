use std::fmt;

use serde::{Deserialize, Serialize};

/// Exactly one per verified address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Deliverable,
    Undeliverable,
    Risky,
    Unknown,
}

impl State {
    pub const ALL: [State; 4] = [
        State::Deliverable,
        State::Undeliverable,
        State::Risky,
        State::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliverable => "deliverable",
            Self::Undeliverable => "undeliverable",
            Self::Risky => "risky",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to a result. Serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InvalidSyntax,
    DomainNotFound,
    NoMxRecords,
    DnsUnavailable,
    DisposableDomain,
    RoleBased,
    CatchAll,
    LowScore,
    SmtpTimeout,
    SmtpUnavailable,
    SmtpInconclusive,
    VerificationTimeout,
    Valid,
}

impl Reason {
    pub const ALL: [Reason; 13] = [
        Reason::InvalidSyntax,
        Reason::DomainNotFound,
        Reason::NoMxRecords,
        Reason::DnsUnavailable,
        Reason::DisposableDomain,
        Reason::RoleBased,
        Reason::CatchAll,
        Reason::LowScore,
        Reason::SmtpTimeout,
        Reason::SmtpUnavailable,
        Reason::SmtpInconclusive,
        Reason::VerificationTimeout,
        Reason::Valid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "invalid_syntax",
            Self::DomainNotFound => "domain_not_found",
            Self::NoMxRecords => "no_mx_records",
            Self::DnsUnavailable => "dns_unavailable",
            Self::DisposableDomain => "disposable_domain",
            Self::RoleBased => "role_based",
            Self::CatchAll => "catch_all",
            Self::LowScore => "low_score",
            Self::SmtpTimeout => "smtp_timeout",
            Self::SmtpUnavailable => "smtp_unavailable",
            Self::SmtpInconclusive => "smtp_inconclusive",
            Self::VerificationTimeout => "verification_timeout",
            Self::Valid => "valid",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "address syntax is invalid",
            Self::DomainNotFound => "domain does not exist in DNS",
            Self::NoMxRecords => "domain publishes no MX records",
            Self::DnsUnavailable => "DNS failed to answer for the domain",
            Self::DisposableDomain => "domain belongs to a disposable mailbox provider",
            Self::RoleBased => "local part is a role address",
            Self::CatchAll => "server accepts mail for any recipient",
            Self::LowScore => "score below the risky threshold",
            Self::SmtpTimeout => "SMTP probe timed out",
            Self::SmtpUnavailable => "SMTP server unreachable or refused the session",
            Self::SmtpInconclusive => "SMTP reply was ambiguous",
            Self::VerificationTimeout => "verification exceeded its deadline",
            Self::Valid => "no issue found",
        }
    }

    /// Everything but `valid` counts as an issue in aggregate reports.
    pub fn is_issue(&self) -> bool {
        !matches!(self, Self::Valid)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreCategory {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

/// Score, state and reason for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: u8,
    pub state: State,
    pub reason: Reason,
}
