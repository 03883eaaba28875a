use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stats::BatchStats;
use crate::verifier::VerificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("job already holds all {total} results")]
    Overflow { total: usize },
    #[error("job finished with {processed} of {total} results")]
    Incomplete { processed: usize, total: usize },
}

/// Asynchronous bulk verification. Status only moves forward:
/// pending → processing → completed | failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJob {
    pub id: String,
    status: JobStatus,
    total_emails: usize,
    processed_emails: usize,
    /// Completion order; each result names its address.
    results: Vec<VerificationResult>,
    stats: Option<BatchStats>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl BulkJob {
    pub fn new(total_emails: usize) -> Self {
        Self {
            id: new_job_id(),
            status: JobStatus::Pending,
            total_emails,
            processed_emails: 0,
            results: Vec::with_capacity(total_emails),
            stats: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn total_emails(&self) -> usize {
        self.total_emails
    }

    pub fn processed_emails(&self) -> usize {
        self.processed_emails
    }

    pub fn results(&self) -> &[VerificationResult] {
        &self.results
    }

    pub fn stats(&self) -> Option<&BatchStats> {
        self.stats.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Fraction done in `0.0..=1.0`. An empty job counts as done.
    pub fn progress(&self) -> f64 {
        if self.total_emails == 0 {
            1.0
        } else {
            self.processed_emails as f64 / self.total_emails as f64
        }
    }

    pub fn start(&mut self) -> Result<(), JobError> {
        self.transition(JobStatus::Pending, JobStatus::Processing)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn record(&mut self, result: VerificationResult) -> Result<(), JobError> {
        if self.status != JobStatus::Processing {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: JobStatus::Processing,
            });
        }
        if self.processed_emails >= self.total_emails {
            return Err(JobError::Overflow {
                total: self.total_emails,
            });
        }
        self.results.push(result);
        self.processed_emails += 1;
        Ok(())
    }

    /// Writes the final stats. Every address must have a result.
    pub fn complete(&mut self) -> Result<(), JobError> {
        if self.status == JobStatus::Processing && self.processed_emails < self.total_emails {
            return Err(JobError::Incomplete {
                processed: self.processed_emails,
                total: self.total_emails,
            });
        }
        self.transition(JobStatus::Processing, JobStatus::Completed)?;
        self.stats = Some(BatchStats::from_results(&self.results));
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the job failed. Results recorded so far are kept and summarized.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), JobError> {
        self.transition(JobStatus::Processing, JobStatus::Failed)?;
        self.error_message = Some(message.into());
        self.stats = Some(BatchStats::from_results(&self.results));
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, expected: JobStatus, next: JobStatus) -> Result<(), JobError> {
        if self.status != expected {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

fn new_job_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
