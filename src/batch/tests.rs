use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::classify::DisposableCheck;
use crate::score::{Assessment, Reason, State};
use crate::verifier::{Checks, VerificationResult};

fn result(email: &str, state: State, score: u8, reason: Reason) -> VerificationResult {
    VerificationResult::new(
        email,
        Assessment {
            score,
            state,
            reason,
        },
        Checks {
            syntax_valid: true,
            ..Checks::default()
        },
    )
}

fn disposable(email: &str) -> VerificationResult {
    let mut r = result(email, State::Risky, 40, Reason::DisposableDomain);
    r.checks.disposable = DisposableCheck {
        is_disposable: true,
        provider: None,
    };
    r
}

#[test]
fn stats_count_states_and_round_percentages() {
    let mut results: Vec<_> = (0..7)
        .map(|i| result(&format!("u{i}@example.com"), State::Deliverable, 100, Reason::Valid))
        .collect();
    results.extend((0..3).map(|i| disposable(&format!("t{i}@mailinator.com"))));

    let stats = BatchStats::from_results(&results);
    assert_eq!(stats.total, 10);
    assert_eq!(stats.deliverable, 7);
    assert_eq!(stats.risky, 3);
    assert_eq!(stats.disposable, 3);
    assert_eq!(stats.percentages.disposable, 30);
    assert_eq!(stats.percentages.deliverable, 70);
    assert_eq!(stats.average_score, 82.0);
    assert_eq!(stats.score_distribution.excellent, 7);
    assert_eq!(stats.score_distribution.poor, 3);
}

#[test]
fn empty_batch_has_zeroed_stats() {
    let stats = BatchStats::from_results(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.average_score, 0.0);
    assert_eq!(stats.percentages.deliverable, 0);
}

#[test]
fn percentages_round_to_nearest() {
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(1, 8), 13);
    assert_eq!(percentage(0, 0), 0);
}

#[test]
fn top_issues_sort_by_count_then_first_seen() {
    let results = vec![
        result("a@x.com", State::Risky, 80, Reason::RoleBased),
        result("b@x.com", State::Undeliverable, 0, Reason::NoMxRecords),
        result("c@x.com", State::Deliverable, 100, Reason::Valid),
        result("d@x.com", State::Undeliverable, 0, Reason::NoMxRecords),
        result("e@x.com", State::Unknown, 90, Reason::SmtpTimeout),
        result("f@x.com", State::Risky, 75, Reason::CatchAll),
        result("g@x.com", State::Risky, 80, Reason::RoleBased),
        result("h@x.com", State::Undeliverable, 0, Reason::InvalidSyntax),
        result("i@x.com", State::Risky, 40, Reason::DisposableDomain),
    ];
    let issues = top_issues(&results, TOP_ISSUES);
    let ranked: Vec<_> = issues.iter().map(|i| (i.reason, i.count)).collect();
    assert_eq!(
        ranked,
        vec![
            (Reason::RoleBased, 2),
            (Reason::NoMxRecords, 2),
            (Reason::SmtpTimeout, 1),
            (Reason::CatchAll, 1),
            (Reason::InvalidSyntax, 1),
        ]
    );
    assert_eq!(issues[0].percentage, 22);
}

#[test]
fn job_lifecycle_moves_forward_only() {
    let mut job = BulkJob::new(2);
    assert_eq!(job.status(), JobStatus::Pending);
    assert_eq!(job.id.len(), 16);
    assert!(job.record(result("a@x.com", State::Deliverable, 100, Reason::Valid)).is_err());
    assert!(job.complete().is_err());

    job.start().unwrap();
    assert!(job.started_at().is_some());
    assert!(job.start().is_err());
    job.record(result("a@x.com", State::Deliverable, 100, Reason::Valid))
        .unwrap();
    assert_eq!(
        job.complete(),
        Err(JobError::Incomplete {
            processed: 1,
            total: 2
        })
    );
    job.record(result("b@x.com", State::Risky, 60, Reason::RoleBased))
        .unwrap();
    assert_eq!(
        job.record(result("c@x.com", State::Risky, 60, Reason::RoleBased)),
        Err(JobError::Overflow { total: 2 })
    );
    assert_eq!(job.progress(), 1.0);

    job.complete().unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.stats().map(|s| s.total), Some(2));
    assert!(job.error_message().is_none());
    assert!(job.fail("late").is_err());
}

#[test]
fn failed_job_keeps_partial_results() {
    let mut job = BulkJob::new(3);
    job.start().unwrap();
    job.record(result("a@x.com", State::Deliverable, 100, Reason::Valid))
        .unwrap();
    job.fail("worker crashed").unwrap();

    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error_message(), Some("worker crashed"));
    assert_eq!(job.results().len(), 1);
    assert_eq!(job.processed_emails(), 1);
    assert!(job.processed_emails() <= job.total_emails());
    assert!(job.completed_at().is_some());
}

#[test]
fn dedup_is_case_insensitive_and_order_preserving() {
    let input = [
        " Alice@Example.com",
        "bob@example.com",
        "",
        "alice@example.COM",
        "carol@example.com",
        "BOB@example.com",
    ];
    assert_eq!(
        dedup_addresses(&input),
        vec!["Alice@Example.com", "bob@example.com", "carol@example.com"]
    );
}

#[tokio::test]
async fn run_bounded_caps_in_flight_and_keeps_order() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let inputs: Vec<u64> = (0..20).collect();

    let mut completed = 0;
    let run = run_bounded(
        inputs,
        3,
        |n| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                // Later inputs finish first.
                tokio::time::sleep(Duration::from_millis(30 - n)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n * 10
            }
        },
        |_, _| completed += 1,
    )
    .await;

    assert!(run.is_complete());
    assert_eq!(completed, 20);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    let outputs: Vec<u64> = run.outputs.into_iter().flatten().collect();
    assert_eq!(outputs, (0..20).map(|n| n * 10).collect::<Vec<_>>());
}

#[tokio::test]
async fn run_bounded_reports_panicked_tasks() {
    let run = run_bounded(
        vec![1u32, 2, 3],
        2,
        |n| async move {
            if n == 2 {
                panic!("boom");
            }
            n
        },
        |_, _| {},
    )
    .await;
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.outputs, vec![Some(1), None, Some(3)]);
}
