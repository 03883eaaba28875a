//! Bounded-concurrency fan-out, aggregate statistics and job tracking.

mod job;
mod stats;

#[cfg(test)]
mod tests;

pub use job::{BulkJob, JobError, JobStatus};
pub use stats::{
    BatchStats, IssueCount, Percentages, ScoreDistribution, TOP_ISSUES, percentage, top_issues,
};

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Outputs of [`run_bounded`], slot `i` belonging to input `i`. A slot is
/// `None` only when its task panicked; `failures` then explains why.
#[derive(Debug)]
pub struct BatchRun<O> {
    pub outputs: Vec<Option<O>>,
    pub failures: Vec<String>,
}

impl<O> BatchRun<O> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs `work` over `inputs` with at most `concurrency` futures in flight.
/// `on_complete` sees each output as it finishes, in completion order.
pub async fn run_bounded<I, O, F, Fut>(
    inputs: Vec<I>,
    concurrency: usize,
    work: F,
    mut on_complete: impl FnMut(usize, &O),
) -> BatchRun<O>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
    O: Send + 'static,
{
    let total = inputs.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fut = work(input);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (index, fut.await)
        });
    }

    let mut outputs: Vec<Option<O>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, output)) => {
                on_complete(index, &output);
                if let Some(slot) = outputs.get_mut(index) {
                    *slot = Some(output);
                }
            }
            Err(err) => {
                error!(error = %err, "batch task failed");
                failures.push(err.to_string());
            }
        }
    }
    debug!(total, failed = failures.len(), "batch drained");
    BatchRun { outputs, failures }
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling of each address.
pub fn dedup_addresses<S: AsRef<str>>(emails: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    emails
        .iter()
        .map(|email| email.as_ref().trim())
        .filter(|email| !email.is_empty())
        .filter(|email| seen.insert(email.to_lowercase()))
        .map(str::to_string)
        .collect()
}
