//! Public entry points tying the pipeline together.
//!
//! [`Verifier`] is a cheap handle (`Arc` inside) so batch tasks can each own
//! a clone. Per-address work: parse → DNS + classification → SMTP probe (only
//! with a live MX) → score.

mod reports;
mod types;


pub use reports::{CatchAllReport, DeliverabilityChecks, DeliverabilityReport, ListHealthReport};
pub use types::{Checks, VerificationResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use trust_dns_resolver::TokioAsyncResolver;

use crate::batch::{self, BatchStats, BulkJob, TOP_ISSUES, dedup_addresses, run_bounded, top_issues};
use crate::classify::{Classifier, DisposableCheck, RoleCheck, parse_domain_list};
use crate::config::{VerifierConfig, VerifyOptions};
use crate::dns::{DnsFacts, DnsLookup, DomainIntelligence, TtlCache, system_resolver};
use crate::error::VerifyError;
use crate::parser::{parse_address, suggest_domain};
use crate::score::{self, Signals, score_address, score_domain};
use crate::smtp::{ProbeResult, SmtpProber};

pub struct Verifier<R = TokioAsyncResolver> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for Verifier<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R> {
    config: VerifierConfig,
    dns: DomainIntelligence<R>,
    classifier: Classifier,
    prober: SmtpProber,
    probe_cache: TtlCache<ProbeResult>,
}

impl Verifier<TokioAsyncResolver> {
    /// Verifier backed by the host resolver configuration.
    pub fn from_system(config: VerifierConfig) -> Result<Self, VerifyError> {
        let resolver = system_resolver()?;
        Self::with_resolver(resolver, config)
    }
}

impl<R: DnsLookup> Verifier<R> {
    pub fn with_resolver(resolver: R, config: VerifierConfig) -> Result<Self, VerifyError> {
        config.validate()?;
        let mut classifier = Classifier::new();
        if let Some(path) = &config.disposable_list {
            let content =
                std::fs::read_to_string(path).map_err(|source| VerifyError::DisposableList {
                    path: path.clone(),
                    source,
                })?;
            classifier = classifier.with_extra_disposable(parse_domain_list(&content));
            debug!(
                path = %path.display(),
                extra = classifier.extra_disposable_len(),
                "extra disposable domains loaded"
            );
        }
        Ok(Self {
            inner: Arc::new(Inner {
                dns: DomainIntelligence::new(resolver, &config.dns),
                probe_cache: TtlCache::new(config.dns.cache_ttl, config.dns.cache_capacity),
                prober: SmtpProber::new(config.smtp.clone()),
                classifier,
                config,
            }),
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.inner.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.inner.classifier
    }

    pub fn dns(&self) -> &DomainIntelligence<R> {
        &self.inner.dns
    }

    /// Verifies one address. Always returns a result; a blown deadline
    /// becomes `verification_timeout`.
    pub async fn verify(&self, email: &str, options: VerifyOptions) -> VerificationResult {
        match self.verify_within(email, options).await {
            Ok(result) => result,
            Err(err) => {
                warn!(email, error = %err, "verification abandoned");
                let mut result = VerificationResult::new(
                    email,
                    score::timed_out(),
                    Checks {
                        syntax_valid: parse_address(email).is_ok(),
                        ..Checks::default()
                    },
                );
                result.duration_ms = millis(self.inner.config.batch.per_address_deadline);
                result
            }
        }
    }

    /// Like [`verify`](Self::verify) but surfaces the per-address deadline as
    /// [`VerifyError::PerAddressTimeout`]. Work still running at the deadline
    /// is dropped and its result discarded.
    pub async fn verify_within(
        &self,
        email: &str,
        options: VerifyOptions,
    ) -> Result<VerificationResult, VerifyError> {
        let deadline = self.inner.config.batch.per_address_deadline;
        tokio::time::timeout(deadline, self.run_pipeline(email, options))
            .await
            .map_err(|_| VerifyError::PerAddressTimeout {
                email: email.to_string(),
                deadline,
            })
    }

    /// Verifies every address with at most `concurrency` in flight. Output
    /// `i` belongs to input `i`.
    #[instrument(skip(self, emails), fields(count = emails.len()))]
    pub async fn verify_batch<S: AsRef<str>>(
        &self,
        emails: &[S],
        options: VerifyOptions,
        concurrency: Option<usize>,
    ) -> Result<Vec<VerificationResult>, VerifyError> {
        let run = self.fan_out(emails, options, concurrency, |_, _| {}).await;
        if !run.is_complete() {
            return Err(VerifyError::Task {
                failed: run.failures.len(),
                message: run.failures.join("; "),
            });
        }
        Ok(run.outputs.into_iter().flatten().collect())
    }

    /// Runs a tracked bulk job over the deduplicated addresses. `progress`
    /// receives `(processed, total)` after each address.
    #[instrument(skip(self, emails, progress), fields(count = emails.len()))]
    pub async fn run_job<S: AsRef<str>>(
        &self,
        emails: &[S],
        options: VerifyOptions,
        concurrency: Option<usize>,
        mut progress: impl FnMut(usize, usize) + Send,
    ) -> Result<BulkJob, VerifyError> {
        let emails = dedup_addresses(emails);
        let total = emails.len();
        let mut job = BulkJob::new(total);
        job.start()?;
        info!(job = %job.id, total, "bulk job started");

        let run = self
            .fan_out(&emails, options, concurrency, |_, result| {
                if let Err(err) = job.record(result.clone()) {
                    warn!(error = %err, "result dropped from job");
                    return;
                }
                progress(job.processed_emails(), total);
            })
            .await;

        if run.is_complete() {
            job.complete()?;
            info!(job = %job.id, "bulk job completed");
        } else {
            let message = format!(
                "{} of {} verifications failed: {}",
                run.failures.len(),
                total,
                run.failures.join("; ")
            );
            job.fail(message)?;
            warn!(job = %job.id, processed = job.processed_emails(), "bulk job failed");
        }
        Ok(job)
    }

    /// Aggregate health of a small list (bounds from `batch.list_health_*`).
    pub async fn list_health<S: AsRef<str>>(
        &self,
        emails: &[S],
        options: VerifyOptions,
    ) -> Result<ListHealthReport, VerifyError> {
        let emails = dedup_addresses(emails);
        let batch = &self.inner.config.batch;
        if !(batch.list_health_min..=batch.list_health_max).contains(&emails.len()) {
            return Err(VerifyError::ListSize {
                min: batch.list_health_min,
                max: batch.list_health_max,
                got: emails.len(),
            });
        }
        let results = self.verify_batch(&emails, options, None).await?;
        Ok(ListHealthReport {
            stats: BatchStats::from_results(&results),
            top_issues: top_issues(&results, TOP_ISSUES),
            results,
        })
    }

    #[instrument(skip(self))]
    pub async fn test_deliverability(&self, domain: &str) -> DeliverabilityReport {
        let domain = domain_of(domain);
        let facts = self.inner.dns.facts(&domain).await;
        let disposable = self.inner.classifier.disposable(&facts.domain).is_disposable;
        let posture = score_domain(&facts, disposable);
        DeliverabilityReport {
            domain: facts.domain.clone(),
            overall_score: posture.score,
            checks: DeliverabilityChecks {
                domain_exists: facts.domain_exists,
                mx_records: facts.mx_records,
                spf_record: facts.spf,
                dkim_record: facts.dkim,
                dmarc_record: facts.dmarc,
                provider: facts.provider,
            },
            risks: posture.risks,
            recommendations: posture.recommendations,
        }
    }

    #[instrument(skip(self))]
    pub async fn detect_catch_all(&self, domain: &str) -> CatchAllReport {
        let domain = domain_of(domain);
        let facts = self.inner.dns.facts(&domain).await;
        if facts.existence_unknown {
            return CatchAllReport::without_probe(&facts.domain, "MX lookup failed");
        }
        if !facts.has_mx {
            return CatchAllReport::without_probe(
                &facts.domain,
                "The domain has no MX records and cannot receive mail",
            );
        }
        if !self.inner.config.smtp.enabled {
            return CatchAllReport::without_probe(&facts.domain, "SMTP probing is disabled");
        }
        match self.catch_all_probe(&facts).await {
            Some(probe) => CatchAllReport::from_probe(&facts.domain, &probe),
            None => CatchAllReport::without_probe(&facts.domain, "No MX host to probe"),
        }
    }

    async fn fan_out<S: AsRef<str>>(
        &self,
        emails: &[S],
        options: VerifyOptions,
        concurrency: Option<usize>,
        on_complete: impl FnMut(usize, &VerificationResult),
    ) -> batch::BatchRun<VerificationResult> {
        let concurrency = self.inner.config.batch.effective_concurrency(concurrency);
        let inputs: Vec<String> = emails.iter().map(|e| e.as_ref().to_string()).collect();
        debug!(count = inputs.len(), concurrency, "fanning out verifications");
        run_bounded(
            inputs,
            concurrency,
            |email| {
                let verifier = self.clone();
                async move { verifier.verify(&email, options).await }
            },
            on_complete,
        )
        .await
    }

    async fn run_pipeline(&self, email: &str, options: VerifyOptions) -> VerificationResult {
        let started = Instant::now();
        let inner = &*self.inner;

        let parsed = match parse_address(email) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(email, error = %err, "syntax rejected");
                let signals = Signals::default();
                let mut result = VerificationResult::new(
                    email,
                    score_address(&signals, &inner.config.scoring),
                    Checks {
                        syntax_valid: false,
                        syntax_errors: err.reasons,
                        ..Checks::default()
                    },
                );
                result.duration_ms = elapsed_ms(started);
                return result;
            }
        };

        let did_you_mean = if options.skip_typo {
            None
        } else {
            suggest_domain(&parsed.domain).map(str::to_string)
        };
        let disposable = if options.skip_disposable {
            DisposableCheck::default()
        } else {
            inner.classifier.disposable(&parsed.ascii_domain)
        };
        let role = if options.skip_role {
            RoleCheck::default()
        } else {
            inner.classifier.role(&parsed.local)
        };
        let free = inner.classifier.free(&parsed.ascii_domain);

        let facts = inner.dns.facts(&parsed.ascii_domain).await;
        let probe = if facts.has_mx && inner.config.smtp.enabled {
            self.catch_all_probe(&facts).await
        } else {
            None
        };

        let signals = Signals {
            syntax_valid: true,
            domain_exists: facts.domain_exists,
            has_mx: facts.has_mx,
            dns_unavailable: facts.existence_unknown,
            disposable: disposable.is_disposable,
            role: role.is_role,
            probe: probe.as_ref(),
            syntax_warnings: parsed.warnings.len(),
            typo_suggested: did_you_mean.is_some(),
        };
        let assessment = score_address(&signals, &inner.config.scoring);

        let mut result = VerificationResult::new(
            email,
            assessment,
            Checks {
                syntax_valid: true,
                syntax_errors: Vec::new(),
                syntax_warnings: parsed.warnings,
                disposable,
                role,
                free,
                catch_all: probe,
                dns: Some(facts),
            },
        );
        result.did_you_mean = did_you_mean;
        result.duration_ms = elapsed_ms(started);
        debug!(
            email,
            state = %result.state,
            score = result.score,
            reason = %result.reason,
            "address verified"
        );
        result
    }

    /// Probe result for the domain, shared between addresses through the
    /// cache. Failed probes are not cached.
    async fn catch_all_probe(&self, facts: &DnsFacts) -> Option<ProbeResult> {
        let inner = &*self.inner;
        if let Some(cached) = inner.probe_cache.get(&facts.domain) {
            debug!(domain = %facts.domain, "catch-all result served from cache");
            return Some(cached);
        }
        let probe = inner
            .prober
            .probe_domain(&facts.domain, &facts.mx_records)
            .await?;
        if !probe.is_failure() {
            inner.probe_cache.insert(&facts.domain, probe.clone());
        }
        Some(probe)
    }
}

/// Accepts `example.com` or `someone@example.com`.
fn domain_of(input: &str) -> String {
    let input = input.trim();
    input
        .rsplit_once('@')
        .map_or(input, |(_, domain)| domain)
        .trim_end_matches('.')
        .to_lowercase()
}

fn elapsed_ms(started: Instant) -> u64 {
    millis(started.elapsed())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
