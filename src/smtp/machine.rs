//! Pure SMTP probe state machine.
//!
//! The driver feeds it events (a parsed reply, the deadline timer, a socket
//! error) and writes whatever command it hands back. Each command is issued
//! only after the reply to the previous one. No I/O happens here.

use super::types::{Confidence, ProbeFailure, SmtpReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    /// Connected, waiting for the greeting.
    Connecting,
    EhloSent,
    MailFromSent,
    RcptToSent,
    Resolved(Verdict),
    Failed { kind: ProbeFailure, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Reply(SmtpReply),
    TimerFired,
    SocketError(String),
}

/// Classified RCPT TO reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_catch_all: bool,
    pub confidence: Confidence,
    pub response: String,
}

impl Verdict {
    pub fn from_rcpt_reply(reply: &SmtpReply) -> Self {
        let (is_catch_all, confidence) = if reply.is_positive_completion() {
            (true, Confidence::High)
        } else if reply.is_permanent_failure() {
            let confidence = match reply.code {
                550 => Confidence::High,
                552 | 554 => Confidence::Low,
                _ => Confidence::Medium,
            };
            (false, confidence)
        } else {
            (false, Confidence::Low)
        };
        Self {
            is_catch_all,
            confidence,
            response: reply.summary(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeMachine {
    state: ProbeState,
    ehlo: String,
    mail_from: String,
    rcpt_to: String,
}

impl ProbeMachine {
    pub fn new(helo_domain: &str, mail_from: &str, recipient: &str) -> Self {
        Self {
            state: ProbeState::Connecting,
            ehlo: format!("EHLO {helo_domain}"),
            mail_from: format!("MAIL FROM:<{mail_from}>"),
            rcpt_to: format!("RCPT TO:<{recipient}>"),
        }
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            ProbeState::Resolved(_) | ProbeState::Failed { .. }
        )
    }

    /// Advances on `event` and returns the next command to write, if any.
    /// Events after a terminal state are ignored.
    pub fn on_event(&mut self, event: ProbeEvent) -> Option<String> {
        if self.is_terminal() {
            return None;
        }
        let reply = match event {
            ProbeEvent::Reply(reply) => reply,
            ProbeEvent::TimerFired => {
                let stage = self.stage();
                self.fail(
                    ProbeFailure::Timeout,
                    format!("timeout: no reply while {stage}"),
                );
                return None;
            }
            ProbeEvent::SocketError(message) => {
                self.fail(ProbeFailure::Unreachable, message);
                return None;
            }
        };

        match self.state {
            ProbeState::Connecting => self.advance_on_positive(
                &reply,
                "greeting",
                ProbeState::EhloSent,
                self.ehlo.clone(),
            ),
            ProbeState::EhloSent => self.advance_on_positive(
                &reply,
                "EHLO",
                ProbeState::MailFromSent,
                self.mail_from.clone(),
            ),
            ProbeState::MailFromSent => self.advance_on_positive(
                &reply,
                "MAIL FROM",
                ProbeState::RcptToSent,
                self.rcpt_to.clone(),
            ),
            ProbeState::RcptToSent => {
                self.state = ProbeState::Resolved(Verdict::from_rcpt_reply(&reply));
                None
            }
            ProbeState::Resolved(_) | ProbeState::Failed { .. } => None,
        }
    }

    fn advance_on_positive(
        &mut self,
        reply: &SmtpReply,
        step: &str,
        next: ProbeState,
        command: String,
    ) -> Option<String> {
        if reply.is_positive_completion() {
            self.state = next;
            Some(command)
        } else {
            self.fail(
                ProbeFailure::Refused,
                format!("{step} rejected: {}", reply.summary()),
            );
            None
        }
    }

    fn fail(&mut self, kind: ProbeFailure, reason: String) {
        self.state = ProbeState::Failed { kind, reason };
    }

    fn stage(&self) -> &'static str {
        match self.state {
            ProbeState::Connecting => "awaiting greeting",
            ProbeState::EhloSent => "awaiting EHLO reply",
            ProbeState::MailFromSent => "awaiting MAIL FROM reply",
            ProbeState::RcptToSent => "awaiting RCPT TO reply",
            ProbeState::Resolved(_) | ProbeState::Failed { .. } => "finished",
        }
    }
}
