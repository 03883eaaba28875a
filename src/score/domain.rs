use serde::{Deserialize, Serialize};

use crate::dns::{DmarcPolicy, DnsFacts};

mod penalty {
    pub const NO_MX: u32 = 40;
    pub const NO_SPF: u32 = 20;
    pub const NO_DKIM: u32 = 15;
    pub const NO_DMARC: u32 = 15;
    pub const DMARC_MONITOR_ONLY: u32 = 5;
    pub const SPF_PERMISSIVE: u32 = 10;
    pub const DISPOSABLE: u32 = 30;
}

/// Deliverability posture of a sending/receiving domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPosture {
    pub score: u8,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn score_domain(facts: &DnsFacts, disposable: bool) -> DomainPosture {
    if !facts.domain_exists {
        return DomainPosture {
            score: 0,
            risks: vec!["Domain does not resolve in DNS".to_string()],
            recommendations: vec!["Check the domain spelling or registration".to_string()],
        };
    }

    let mut penalty = 0u32;
    let mut risks = Vec::new();
    let mut recommendations = Vec::new();
    let mut flag = |points: u32, risk: &str, advice: &str| {
        penalty += points;
        risks.push(risk.to_string());
        recommendations.push(advice.to_string());
    };

    if !facts.has_mx {
        flag(
            penalty::NO_MX,
            "No MX records: the domain cannot receive mail",
            "Publish MX records pointing at a mail server",
        );
    }
    if !facts.spf.present {
        flag(
            penalty::NO_SPF,
            "No SPF record",
            "Publish a v=spf1 TXT record listing authorized senders",
        );
    } else if facts.spf.is_permissive() {
        flag(
            penalty::SPF_PERMISSIVE,
            "SPF record ends in +all or ?all and authorizes any sender",
            "Tighten the SPF record to ~all or -all",
        );
    }
    if !facts.dkim.present {
        flag(
            penalty::NO_DKIM,
            "No DKIM key found on common selectors",
            "Sign outgoing mail with DKIM and publish the selector key",
        );
    }
    match facts.dmarc.policy {
        _ if !facts.dmarc.present => flag(
            penalty::NO_DMARC,
            "No DMARC record",
            "Publish a _dmarc TXT record, starting with p=none and reporting",
        ),
        Some(DmarcPolicy::None) | None => flag(
            penalty::DMARC_MONITOR_ONLY,
            "DMARC policy is monitoring only (p=none)",
            "Move the DMARC policy to quarantine or reject once reports are clean",
        ),
        Some(DmarcPolicy::Quarantine | DmarcPolicy::Reject) => {}
    }
    if disposable {
        flag(
            penalty::DISPOSABLE,
            "Domain belongs to a disposable mailbox provider",
            "Do not rely on this domain for long-lived communication",
        );
    }

    DomainPosture {
        score: 100u32.saturating_sub(penalty) as u8,
        risks,
        recommendations,
    }
}
