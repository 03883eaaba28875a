use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::batch::JobError;
use crate::config::ConfigError;
use crate::dns::DnsError;
use crate::parser::SyntaxError;

/// Crate-level error. Address-level problems never surface here from
/// [`Verifier::verify`](crate::Verifier::verify); they become structured results.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    InvalidSyntax(#[from] SyntaxError),
    #[error("verification of {email} exceeded {deadline:?}")]
    PerAddressTimeout { email: String, deadline: Duration },
    #[error("list health needs between {min} and {max} distinct addresses, got {got}")]
    ListSize { min: usize, max: usize, got: usize },
    #[error("{failed} verification task(s) failed: {message}")]
    Task { failed: usize, message: String },
    #[error("cannot read disposable list {path}: {source}")]
    DisposableList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dns(#[from] DnsError),
}
