//! Extraction of SPF, DMARC and DKIM facts from raw TXT records.

use std::collections::HashMap;

use super::types::{DmarcFact, DmarcPolicy, SpfFact, SpfQualifier};

/// First TXT record starting with `v=spf1`.
pub(crate) fn spf_from(records: &[String]) -> SpfFact {
    let Some(record) = records
        .iter()
        .map(|record| record.trim())
        .find(|trimmed| starts_with_ignore_ascii_case(trimmed, "v=spf1"))
    else {
        return SpfFact::default();
    };

    let qualifier = record
        .split_whitespace()
        .skip(1)
        .find_map(|token| qualifier_from_token(&token.to_ascii_lowercase()));

    SpfFact {
        present: true,
        record: Some(record.to_string()),
        qualifier,
    }
}

/// First TXT record starting with `v=DMARC1`; the policy comes from `p=`.
pub(crate) fn dmarc_from(records: &[String]) -> DmarcFact {
    let Some(record) = records
        .iter()
        .map(|record| record.trim())
        .find(|trimmed| starts_with_ignore_ascii_case(trimmed, "v=dmarc1"))
    else {
        return DmarcFact::default();
    };

    let tags = parse_tags(record);
    let policy = tags
        .get("p")
        .and_then(|value| match value.to_ascii_lowercase().as_str() {
            "none" => Some(DmarcPolicy::None),
            "quarantine" => Some(DmarcPolicy::Quarantine),
            "reject" => Some(DmarcPolicy::Reject),
            _ => None,
        });

    DmarcFact {
        present: true,
        record: Some(record.to_string()),
        policy,
    }
}

/// First TXT record carrying a `p=` tag.
pub(crate) fn dkim_from(records: &[String]) -> Option<String> {
    records
        .iter()
        .map(|record| record.trim())
        .find(|record| parse_tags(record).contains_key("p"))
        .map(str::to_string)
}

fn starts_with_ignore_ascii_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

fn qualifier_from_token(token: &str) -> Option<SpfQualifier> {
    match token {
        "-all" => Some(SpfQualifier::Fail),
        "~all" => Some(SpfQualifier::SoftFail),
        "?all" => Some(SpfQualifier::Neutral),
        "all" | "+all" => Some(SpfQualifier::Pass),
        _ => None,
    }
}

fn parse_tags(record: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for part in record.split(';') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        tags.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }
    tags
}
