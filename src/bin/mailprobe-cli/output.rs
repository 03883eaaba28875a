use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use mailprobe_lib::{
    BulkJob, CatchAllReport, DeliverabilityReport, ListHealthReport, State, VerificationResult,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
    Ndjson,
    Csv,
}

impl Format {
    pub fn is_machine(&self) -> bool {
        !matches!(self, Self::Human)
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            "csv" => Ok(Self::Csv),
            other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
        }
    }
}

#[derive(Serialize)]
struct Success<'a, T: Serialize> {
    success: bool,
    data: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    success: bool,
    message: &'a str,
}

/// `{"success": false, "message": ...}`
pub fn failure_json(message: &str) -> String {
    serde_json::to_string(&Failure {
        success: false,
        message,
    })
    .unwrap_or_else(|_| r#"{"success":false,"message":"serialization failed"}"#.to_string())
}

/// Where reports go: `--out` (atomic) or stdout.
pub struct Sink<'a> {
    pub format: Format,
    pub out: Option<&'a Path>,
}

impl Sink<'_> {
    /// Per-address rows: ndjson and csv emit one line per address.
    pub fn results(&self, rows: &[VerificationResult]) -> Result<()> {
        match self.format {
            Format::Human => self.write(human_results(rows).as_bytes()),
            Format::Json => self.write(&wrapped_json(&rows)?),
            Format::Ndjson => {
                let mut buf = Vec::new();
                for row in rows {
                    serde_json::to_writer(&mut buf, row)?;
                    buf.push(b'\n');
                }
                self.write(&buf)
            }
            Format::Csv => self.write(&csv_bytes(rows)?),
        }
    }

    /// Single report; `human` renders the text form.
    pub fn report<T: Serialize>(&self, report: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
        match self.format {
            Format::Human => self.write(human(report).as_bytes()),
            Format::Json => self.write(&wrapped_json(report)?),
            Format::Ndjson => {
                let mut buf = serde_json::to_vec(report)?;
                buf.push(b'\n');
                self.write(&buf)
            }
            Format::Csv => bail!("format=csv ne s'applique qu'aux résultats par adresse"),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        match self.out {
            Some(path) => write_all_atomically(path, bytes),
            None => {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(bytes)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}

pub fn any_undeliverable(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| row.state == State::Undeliverable)
}

fn wrapped_json<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(&Success {
        success: true,
        data,
    })?;
    buf.push(b'\n');
    Ok(buf)
}

fn human_results(rows: &[VerificationResult]) -> String {
    let mut text = String::new();
    for row in rows {
        let tag = match row.state {
            State::Deliverable => "[OK]     ",
            State::Undeliverable => "[INVALID]",
            State::Risky => "[RISKY]  ",
            State::Unknown => "[UNKNOWN]",
        };
        let _ = writeln!(
            text,
            "{tag} {} score={} reason={}",
            row.email, row.score, row.reason
        );
        if let Some(suggestion) = &row.did_you_mean {
            let _ = writeln!(text, "          did you mean: {suggestion}");
        }
        if !row.checks.syntax_errors.is_empty() {
            let _ = writeln!(text, "          syntax: {}", row.checks.syntax_errors.join("; "));
        }
        if !row.checks.syntax_warnings.is_empty() {
            let _ = writeln!(text, "          warnings: {}", row.checks.syntax_warnings.join("; "));
        }
        if let Some(probe) = &row.checks.catch_all {
            let _ = writeln!(
                text,
                "          smtp: catch_all={} confidence={} {}",
                probe.is_catch_all,
                probe.confidence,
                probe.smtp_response.as_deref().unwrap_or("")
            );
        }
    }
    text
}

pub fn human_deliverability(report: &DeliverabilityReport) -> String {
    let checks = &report.checks;
    let mut text = String::new();
    let _ = writeln!(text, "{} score={}", report.domain, report.overall_score);
    let _ = writeln!(text, "  domain exists: {}", checks.domain_exists);
    let mx = checks
        .mx_records
        .iter()
        .map(|mx| format!("{} {}", mx.priority, mx.exchange))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(text, "  mx: {}", if mx.is_empty() { "-" } else { mx.as_str() });
    let _ = writeln!(text, "  spf: {}", checks.spf_record.record.as_deref().unwrap_or("-"));
    let _ = writeln!(text, "  dmarc: {}", checks.dmarc_record.record.as_deref().unwrap_or("-"));
    let _ = writeln!(
        text,
        "  dkim: {}",
        checks.dkim_record.selector_used.as_deref().unwrap_or("-")
    );
    if let Some(provider) = &checks.provider {
        let _ = writeln!(text, "  provider: {provider}");
    }
    for (risk, advice) in report.risks.iter().zip(&report.recommendations) {
        let _ = writeln!(text, "  ! {risk}\n    -> {advice}");
    }
    text
}

pub fn human_catch_all(report: &CatchAllReport) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} catch_all={} confidence={}",
        report.domain, report.is_catch_all, report.confidence
    );
    let _ = writeln!(text, "  {}", report.explanation);
    if let Some(response) = &report.smtp_response {
        let _ = writeln!(text, "  smtp: {response}");
    }
    for line in &report.implications {
        let _ = writeln!(text, "  * {line}");
    }
    for line in &report.recommendations {
        let _ = writeln!(text, "  -> {line}");
    }
    text
}

pub fn human_list_health(report: &ListHealthReport) -> String {
    let stats = &report.stats;
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} addresses, average score {:.1}",
        stats.total, stats.average_score
    );
    let _ = writeln!(
        text,
        "  deliverable {} ({}%)  undeliverable {} ({}%)  risky {} ({}%)  unknown {} ({}%)",
        stats.deliverable,
        stats.percentages.deliverable,
        stats.undeliverable,
        stats.percentages.undeliverable,
        stats.risky,
        stats.percentages.risky,
        stats.unknown,
        stats.percentages.unknown
    );
    let _ = writeln!(
        text,
        "  disposable {} ({}%)  role {} ({}%)",
        stats.disposable, stats.percentages.disposable, stats.role, stats.percentages.role
    );
    for issue in &report.top_issues {
        let _ = writeln!(
            text,
            "  {:<22} {:>3} ({}%)",
            issue.reason.as_str(),
            issue.count,
            issue.percentage
        );
    }
    text
}

pub fn human_job(job: &BulkJob) -> String {
    let mut text = format!(
        "job {} {} ({}/{})\n",
        job.id,
        job.status(),
        job.processed_emails(),
        job.total_emails()
    );
    if let Some(message) = job.error_message() {
        let _ = writeln!(text, "  error: {message}");
    }
    text.push_str(&human_results(job.results()));
    text
}

#[cfg(feature = "with-csv")]
fn csv_bytes(rows: &[VerificationResult]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "email",
        "state",
        "score",
        "reason",
        "did_you_mean",
        "disposable",
        "role",
        "free",
        "catch_all",
        "confidence",
    ])?;
    for row in rows {
        let probe = row.checks.catch_all.as_ref();
        wtr.write_record([
            row.email.clone(),
            row.state.to_string(),
            row.score.to_string(),
            row.reason.to_string(),
            row.did_you_mean.clone().unwrap_or_default(),
            row.checks.disposable.is_disposable.to_string(),
            row.checks.role.is_role.to_string(),
            row.checks.free.is_free.to_string(),
            probe.map(|p| p.is_catch_all.to_string()).unwrap_or_default(),
            probe.map(|p| p.confidence.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.into_inner().context("flush csv")
}

#[cfg(not(feature = "with-csv"))]
fn csv_bytes(_: &[VerificationResult]) -> Result<Vec<u8>> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = path.with_extension("tmp");
    {
        let mut f = std::fs::File::create(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
