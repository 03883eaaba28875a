//! Rule-based scoring: fixed penalties from 100, clamped, then a state
//! picked in priority order.

mod domain;
mod types;


pub use domain::{DomainPosture, score_domain};
pub use types::{Assessment, Reason, ScoreCategory, State};

use crate::config::ScoringConfig;
use crate::smtp::{Confidence, ProbeFailure, ProbeResult};

pub mod penalty {
    pub const DISPOSABLE: u32 = 50;
    pub const ROLE: u32 = 20;
    pub const CATCH_ALL: u32 = 25;
    pub const UNVERIFIED: u32 = 10;
    pub const SYNTAX_WARNING: u32 = 5;
    pub const SYNTAX_WARNING_CAP: u32 = 15;
    pub const TYPO: u32 = 15;
}

/// Everything the scorer looks at for one address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals<'a> {
    pub syntax_valid: bool,
    pub domain_exists: bool,
    pub has_mx: bool,
    /// DNS could not answer the MX question; a missing domain or MX is then
    /// not grounds for `undeliverable`.
    pub dns_unavailable: bool,
    pub disposable: bool,
    pub role: bool,
    /// `None` when no probe ran (disabled or skipped).
    pub probe: Option<&'a ProbeResult>,
    pub syntax_warnings: usize,
    pub typo_suggested: bool,
}

impl Signals<'_> {
    fn catch_all_high(&self) -> bool {
        self.probe
            .is_some_and(|p| p.is_catch_all && p.confidence == Confidence::High)
    }
}

pub fn score_address(signals: &Signals<'_>, config: &ScoringConfig) -> Assessment {
    let hard_fail = if !signals.syntax_valid {
        Some(Reason::InvalidSyntax)
    } else if !signals.domain_exists {
        Some(Reason::DomainNotFound)
    } else if !signals.has_mx {
        Some(Reason::NoMxRecords)
    } else {
        None
    };
    if let Some(reason) = hard_fail {
        if signals.dns_unavailable && reason != Reason::InvalidSyntax {
            return Assessment {
                score: 0,
                state: State::Unknown,
                reason: Reason::DnsUnavailable,
            };
        }
        return Assessment {
            score: 0,
            state: State::Undeliverable,
            reason,
        };
    }

    let score = raw_score(signals);

    let risky = if signals.disposable {
        Some(Reason::DisposableDomain)
    } else if signals.role {
        Some(Reason::RoleBased)
    } else if signals.catch_all_high() {
        Some(Reason::CatchAll)
    } else if score < config.risky_below {
        Some(Reason::LowScore)
    } else {
        None
    };
    if let Some(reason) = risky {
        return Assessment {
            score,
            state: State::Risky,
            reason,
        };
    }

    if let Some(reason) = signals.probe.and_then(inconclusive_reason) {
        return Assessment {
            score,
            state: State::Unknown,
            reason,
        };
    }

    Assessment {
        score,
        state: State::Deliverable,
        reason: Reason::Valid,
    }
}

/// Result for an address whose verification ran past its deadline.
pub fn timed_out() -> Assessment {
    Assessment {
        score: 0,
        state: State::Unknown,
        reason: Reason::VerificationTimeout,
    }
}

fn raw_score(signals: &Signals<'_>) -> u8 {
    let mut penalty = 0u32;
    if signals.disposable {
        penalty += penalty::DISPOSABLE;
    }
    if signals.role {
        penalty += penalty::ROLE;
    }
    if signals.catch_all_high() {
        penalty += penalty::CATCH_ALL;
    }
    if signals.probe.is_none_or(ProbeResult::is_inconclusive) {
        penalty += penalty::UNVERIFIED;
    }
    let warnings = u32::try_from(signals.syntax_warnings).unwrap_or(u32::MAX);
    penalty += warnings
        .saturating_mul(penalty::SYNTAX_WARNING)
        .min(penalty::SYNTAX_WARNING_CAP);
    if signals.typo_suggested {
        penalty += penalty::TYPO;
    }
    // Clamped to 0..=100, so the cast cannot truncate.
    100u32.saturating_sub(penalty) as u8
}

fn inconclusive_reason(probe: &ProbeResult) -> Option<Reason> {
    match probe.failure {
        Some(ProbeFailure::Timeout) => Some(Reason::SmtpTimeout),
        Some(ProbeFailure::Unreachable | ProbeFailure::Refused) => Some(Reason::SmtpUnavailable),
        None if probe.confidence == Confidence::Low => Some(Reason::SmtpInconclusive),
        None => None,
    }
}
