use thiserror::Error;

/// Transport failures while probing. [`SmtpProber`](super::SmtpProber) never
/// returns these; they become low-confidence [`ProbeResult`](super::ProbeResult)s.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("cannot resolve MX host {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MX host {host} has no usable address")]
    NoAddress { host: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {host} timed out")]
    ConnectTimeout { host: String },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("probe deadline exceeded")]
    Timeout,
}

impl SmtpError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout | Self::ConnectTimeout { .. })
    }
}
