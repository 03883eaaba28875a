#![forbid(unsafe_code)]
//! Vérification de délivrabilité d'adresses e-mail sans envoi de message:
//! syntaxe, DNS (MX/SPF/DKIM/DMARC), classification, sonde catch-all SMTP,
//! score et traitement par lots.

pub mod batch;
pub mod classify;
pub mod config;
pub mod dns;
pub mod error;
pub mod parser;
pub mod score;
pub mod smtp;
pub mod verifier;

pub use batch::{BatchStats, BulkJob, IssueCount, JobError, JobStatus};
pub use classify::Classifier;
pub use config::{ConfigError, VerifierConfig, VerifyOptions};
pub use dns::{DnsError, DnsFacts, DnsLookup, DomainIntelligence, MxRecord};
pub use error::VerifyError;
pub use parser::{ParsedAddress, SyntaxError, parse_address, suggest_domain};
pub use score::{Reason, ScoreCategory, State};
pub use smtp::{Confidence, ProbeResult, SmtpError, SmtpProber};
pub use verifier::{
    CatchAllReport, DeliverabilityReport, ListHealthReport, VerificationResult, Verifier,
};
