//! Catch-all detection over a raw SMTP dialogue.
//!
//! [`SmtpProber::probe`] connects to one MX host, walks
//! greeting → EHLO → MAIL FROM → RCPT TO through a [`ProbeMachine`] and
//! classifies the RCPT reply for a random local part. The whole dialogue is
//! bounded by the probe deadline and the socket is closed on every exit.

mod error;
mod machine;
mod session;
mod types;
mod util;

#[cfg(test)]
mod tests;

pub use error::SmtpError;
pub use machine::{ProbeEvent, ProbeMachine, ProbeState, Verdict};
pub use types::{Confidence, ProbeFailure, ProbeResult, SmtpReply};
pub use util::random_local_part;

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::SmtpConfig;
use crate::dns::MxRecord;
use session::SmtpSession;

/// Time allowed for the closing `QUIT` exchange.
const QUIT_WAIT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SmtpProber {
    config: SmtpConfig,
}

impl SmtpProber {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Probes the lowest-priority MX. `None` when there is no MX at all.
    pub async fn probe_domain(&self, domain: &str, mx_records: &[MxRecord]) -> Option<ProbeResult> {
        let best = mx_records.iter().min_by_key(|mx| mx.priority)?;
        Some(self.probe(domain, best).await)
    }

    /// Runs one probe against `mx`. Never fails: transport problems come
    /// back as a low-confidence result.
    #[instrument(skip(self, mx), fields(mx = %mx.exchange))]
    pub async fn probe(&self, domain: &str, mx: &MxRecord) -> ProbeResult {
        let test_email = format!(
            "{}@{}",
            random_local_part(self.config.random_local_len),
            domain
        );
        let deadline = tokio::time::sleep(self.config.probe_deadline);
        tokio::pin!(deadline);

        let mut machine = ProbeMachine::new(
            &self.config.helo_domain,
            &self.config.mail_from,
            &test_email,
        );

        let connected = tokio::select! {
            result = self.connect(&mx.exchange) => result,
            _ = &mut deadline => Err(SmtpError::Timeout),
        };
        let mut session = match connected {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "smtp probe could not connect");
                let failure = if err.is_timeout() {
                    ProbeFailure::Timeout
                } else {
                    ProbeFailure::Unreachable
                };
                return ProbeResult::failed(
                    failure,
                    err.to_string(),
                    test_email,
                    Some(mx.exchange.clone()),
                );
            }
        };

        while !machine.is_terminal() {
            let event = tokio::select! {
                reply = session.read_reply() => match reply {
                    Ok(reply) => ProbeEvent::Reply(reply),
                    Err(err) => ProbeEvent::SocketError(err.to_string()),
                },
                _ = &mut deadline => ProbeEvent::TimerFired,
            };
            let Some(command) = machine.on_event(event) else {
                continue;
            };
            let written = tokio::select! {
                result = session.send_command(&command) => result,
                _ = &mut deadline => Err(SmtpError::Timeout),
            };
            if let Err(err) = written {
                let event = if err.is_timeout() {
                    ProbeEvent::TimerFired
                } else {
                    ProbeEvent::SocketError(err.to_string())
                };
                machine.on_event(event);
            }
        }

        // The server is still talking to us unless the socket broke or went silent.
        let responsive = matches!(
            machine.state(),
            ProbeState::Resolved(_)
                | ProbeState::Failed {
                    kind: ProbeFailure::Refused,
                    ..
                }
        );
        // QUIT shares the probe deadline.
        let remaining = deadline
            .deadline()
            .saturating_duration_since(tokio::time::Instant::now());
        let quit_wait = QUIT_WAIT.min(remaining);
        if responsive && !quit_wait.is_zero() {
            session.quit(quit_wait).await;
        } else {
            session.close().await;
        }
        let transcript = session.into_transcript();

        let mut result = match machine.state() {
            ProbeState::Resolved(verdict) => ProbeResult {
                is_catch_all: verdict.is_catch_all,
                confidence: verdict.confidence,
                smtp_response: Some(verdict.response.clone()),
                error_reason: None,
                failure: None,
                test_email,
                mx_host: Some(mx.exchange.clone()),
                transcript: Vec::new(),
            },
            ProbeState::Failed { kind, reason } => {
                ProbeResult::failed(*kind, reason.clone(), test_email, Some(mx.exchange.clone()))
            }
            other => ProbeResult::failed(
                ProbeFailure::Unreachable,
                format!("probe stopped in state {other:?}"),
                test_email,
                Some(mx.exchange.clone()),
            ),
        };
        result.transcript = transcript;
        debug!(
            catch_all = result.is_catch_all,
            confidence = %result.confidence,
            response = result.smtp_response.as_deref().unwrap_or(""),
            "smtp probe finished"
        );
        result
    }

    async fn connect(&self, host: &str) -> Result<SmtpSession, SmtpError> {
        let addresses: Vec<SocketAddr> = tokio::net::lookup_host((host, self.config.port))
            .await
            .map_err(|source| SmtpError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();
        SmtpSession::connect(host, &addresses, self.config.connect_timeout).await
    }
}
