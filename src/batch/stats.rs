use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::score::{Reason, ScoreCategory, State};
use crate::verifier::VerificationResult;

/// Issues kept in [`top_issues`] rankings.
pub const TOP_ISSUES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

/// Whole-number percentages of `total`, rounded half away from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub deliverable: u32,
    pub undeliverable: u32,
    pub risky: u32,
    pub unknown: u32,
    pub disposable: u32,
    pub role: u32,
    pub free: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub deliverable: usize,
    pub undeliverable: usize,
    pub risky: usize,
    pub unknown: usize,
    pub disposable: usize,
    pub role: usize,
    pub free: usize,
    pub average_score: f64,
    pub score_distribution: ScoreDistribution,
    pub percentages: Percentages,
}

impl BatchStats {
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut score_sum = 0u64;
        for result in results {
            match result.state {
                State::Deliverable => stats.deliverable += 1,
                State::Undeliverable => stats.undeliverable += 1,
                State::Risky => stats.risky += 1,
                State::Unknown => stats.unknown += 1,
            }
            if result.checks.disposable.is_disposable {
                stats.disposable += 1;
            }
            if result.checks.role.is_role {
                stats.role += 1;
            }
            if result.checks.free.is_free {
                stats.free += 1;
            }
            match ScoreCategory::from_score(result.score) {
                ScoreCategory::Excellent => stats.score_distribution.excellent += 1,
                ScoreCategory::Good => stats.score_distribution.good += 1,
                ScoreCategory::Fair => stats.score_distribution.fair += 1,
                ScoreCategory::Poor => stats.score_distribution.poor += 1,
            }
            score_sum += u64::from(result.score);
        }
        if stats.total > 0 {
            let average = score_sum as f64 / stats.total as f64;
            stats.average_score = (average * 100.0).round() / 100.0;
        }
        let total = stats.total;
        stats.percentages = Percentages {
            deliverable: percentage(stats.deliverable, total),
            undeliverable: percentage(stats.undeliverable, total),
            risky: percentage(stats.risky, total),
            unknown: percentage(stats.unknown, total),
            disposable: percentage(stats.disposable, total),
            role: percentage(stats.role, total),
            free: percentage(stats.free, total),
        };
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub reason: Reason,
    pub count: usize,
    pub percentage: u32,
}

/// Non-`valid` reasons ranked by count, ties kept in first-seen order.
pub fn top_issues(results: &[VerificationResult], limit: usize) -> Vec<IssueCount> {
    let mut order: Vec<Reason> = Vec::new();
    let mut counts: HashMap<Reason, usize> = HashMap::new();
    for result in results.iter().filter(|r| r.reason.is_issue()) {
        let count = counts.entry(result.reason).or_insert(0);
        if *count == 0 {
            order.push(result.reason);
        }
        *count += 1;
    }

    let mut issues: Vec<IssueCount> = order
        .into_iter()
        .map(|reason| {
            let count = counts.get(&reason).copied().unwrap_or(0);
            IssueCount {
                reason,
                count,
                percentage: percentage(count, results.len()),
            }
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    issues.sort_by(|a, b| b.count.cmp(&a.count));
    issues.truncate(limit);
    issues
}

pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 * 100.0 / total as f64).round() as u32
}
