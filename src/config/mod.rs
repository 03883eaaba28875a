//! Runtime configuration: defaults, TOML layering and per-request options.

mod file;

pub use file::ConfigFile;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsConfig {
    pub lookup_timeout: Duration,
    /// Probed in order; the first selector publishing a key wins.
    pub dkim_selectors: Vec<String>,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            dkim_selectors: ["default", "google", "k1", "smtp", "selector1", "selector2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// When false, no probe runs and addresses lose the unverified penalty only.
    pub enabled: bool,
    pub port: u16,
    pub helo_domain: String,
    pub mail_from: String,
    pub connect_timeout: Duration,
    /// Hard bound on a whole probe, banner to QUIT.
    pub probe_deadline: Duration,
    pub random_local_len: usize,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 25,
            helo_domain: "mailprobe.local".to_string(),
            mail_from: "verify@mailprobe.local".to_string(),
            connect_timeout: Duration::from_secs(5),
            probe_deadline: Duration::from_secs(10),
            random_local_len: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    /// Scores strictly below this are `risky`.
    pub risky_below: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { risky_below: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub default_concurrency: usize,
    pub max_concurrency: usize,
    pub per_address_deadline: Duration,
    pub list_health_min: usize,
    pub list_health_max: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_concurrency: 10,
            max_concurrency: 100,
            per_address_deadline: Duration::from_secs(30),
            list_health_min: 10,
            list_health_max: 50,
        }
    }
}

impl BatchConfig {
    /// Clamps a requested concurrency into `1..=max_concurrency`; `None` or 0 picks the default.
    pub fn effective_concurrency(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(0) | None => self.default_concurrency,
            Some(n) => n,
        }
        .clamp(1, self.max_concurrency.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifierConfig {
    pub dns: DnsConfig,
    pub smtp: SmtpConfig,
    pub scoring: ScoringConfig,
    pub batch: BatchConfig,
    /// Extra disposable domains, one per line.
    pub disposable_list: Option<PathBuf>,
}

impl VerifierConfig {
    /// Defaults overlaid with the TOML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::default();
        config.apply_file(file)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        let ConfigFile {
            dns,
            smtp,
            scoring,
            batch,
            disposable_list,
        } = file;

        if let Some(ms) = dns.lookup_timeout_ms {
            self.dns.lookup_timeout = Duration::from_millis(ms);
        }
        if let Some(selectors) = dns.dkim_selectors {
            self.dns.dkim_selectors = selectors;
        }
        if let Some(secs) = dns.cache_ttl_secs {
            self.dns.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = dns.cache_capacity {
            self.dns.cache_capacity = capacity;
        }

        if let Some(enabled) = smtp.enabled {
            self.smtp.enabled = enabled;
        }
        if let Some(port) = smtp.port {
            self.smtp.port = port;
        }
        if let Some(helo) = smtp.helo_domain {
            self.smtp.helo_domain = helo;
        }
        if let Some(from) = smtp.mail_from {
            self.smtp.mail_from = from;
        }
        if let Some(ms) = smtp.connect_timeout_ms {
            self.smtp.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = smtp.probe_deadline_ms {
            self.smtp.probe_deadline = Duration::from_millis(ms);
        }
        if let Some(len) = smtp.random_local_len {
            self.smtp.random_local_len = len;
        }

        if let Some(threshold) = scoring.risky_below {
            self.scoring.risky_below = threshold;
        }

        if let Some(n) = batch.default_concurrency {
            self.batch.default_concurrency = n;
        }
        if let Some(n) = batch.max_concurrency {
            self.batch.max_concurrency = n;
        }
        if let Some(ms) = batch.per_address_deadline_ms {
            self.batch.per_address_deadline = Duration::from_millis(ms);
        }
        if let Some(n) = batch.list_health_min {
            self.batch.list_health_min = n;
        }
        if let Some(n) = batch.list_health_max {
            self.batch.list_health_max = n;
        }

        if disposable_list.is_some() {
            self.disposable_list = disposable_list;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scoring.risky_below > 100 {
            return Err(ConfigError::Invalid {
                key: "scoring.risky_below",
                message: format!("{} is above 100", self.scoring.risky_below),
            });
        }
        if !(8..=64).contains(&self.smtp.random_local_len) {
            return Err(ConfigError::Invalid {
                key: "smtp.random_local_len",
                message: "must be between 8 and 64".to_string(),
            });
        }
        if self.smtp.mail_from.split('@').count() != 2 {
            return Err(ConfigError::Invalid {
                key: "smtp.mail_from",
                message: format!("{:?} is not an address", self.smtp.mail_from),
            });
        }
        if self.batch.max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "batch.max_concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.batch.list_health_min > self.batch.list_health_max {
            return Err(ConfigError::Invalid {
                key: "batch.list_health_min",
                message: "greater than list_health_max".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-request switches. Unknown keys are rejected when deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VerifyOptions {
    /// Do not flag or penalize disposable domains.
    pub skip_disposable: bool,
    /// Do not flag or penalize role-based local parts.
    pub skip_role: bool,
    /// Do not compute a `didYouMean` suggestion.
    pub skip_typo: bool,
}
