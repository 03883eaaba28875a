mod args;
mod output;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};
use mailprobe_lib::{JobStatus, Verifier, VerifierConfig};
use output::{Format, Sink};

// codes de sortie : 0 OK, 2 adresses non délivrables, 1 fatal
const EXIT_FATAL: i32 = 1;
const EXIT_UNDELIVERABLE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let machine_output = cli
        .format
        .parse::<Format>()
        .map(|format| format.is_machine())
        .unwrap_or(false);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if machine_output {
                println!("{}", output::failure_json(&format!("{err:#}")));
            } else {
                eprintln!("error: {err:#}");
            }
            std::process::exit(EXIT_FATAL);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mailprobe_lib=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let format: Format = cli.format.parse()?;
    let sink = Sink {
        format,
        out: cli.out.as_deref(),
    };

    let mut config = match &cli.config {
        Some(path) => VerifierConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => VerifierConfig::default(),
    };
    if cli.no_smtp {
        config.smtp.enabled = false;
    }
    let verifier = Verifier::from_system(config).context("initialise DNS resolver")?;

    match &cli.cmd {
        Commands::Verify { input, options } => {
            let emails = input.collect()?;
            let options = options.to_options();
            let mut rows = Vec::with_capacity(emails.len());
            for email in &emails {
                rows.push(verifier.verify(email, options).await);
            }
            sink.results(&rows)?;
            Ok(exit_code(output::any_undeliverable(&rows)))
        }
        Commands::Batch {
            input,
            options,
            concurrency,
        } => {
            let emails = input.collect()?;
            let rows = verifier
                .verify_batch(&emails, options.to_options(), *concurrency)
                .await?;
            sink.results(&rows)?;
            Ok(exit_code(output::any_undeliverable(&rows)))
        }
        Commands::Deliverability { domain } => {
            let report = verifier.test_deliverability(domain).await;
            sink.report(&report, output::human_deliverability)?;
            Ok(0)
        }
        Commands::CatchAll { domain } => {
            let report = verifier.detect_catch_all(domain).await;
            sink.report(&report, output::human_catch_all)?;
            Ok(0)
        }
        Commands::ListHealth { input, options } => {
            let emails = input.collect()?;
            let report = verifier.list_health(&emails, options.to_options()).await?;
            sink.report(&report, output::human_list_health)?;
            Ok(exit_code(output::any_undeliverable(&report.results)))
        }
        Commands::Job {
            input,
            options,
            concurrency,
            progress,
        } => {
            let emails = input.collect()?;
            let show_progress = *progress;
            let job = verifier
                .run_job(&emails, options.to_options(), *concurrency, |done, total| {
                    if show_progress {
                        eprintln!("[{done}/{total}]");
                    }
                })
                .await?;
            sink.report(&job, output::human_job)?;
            if job.status() == JobStatus::Failed {
                return Ok(EXIT_FATAL);
            }
            Ok(exit_code(output::any_undeliverable(job.results())))
        }
    }
}

fn exit_code(any_undeliverable: bool) -> i32 {
    if any_undeliverable {
        EXIT_UNDELIVERABLE
    } else {
        0
    }
}
