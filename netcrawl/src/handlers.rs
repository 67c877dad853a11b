use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use netcrawl_core::{
    CrawlOutcome, CrawlProgress, DEFAULT_TARGET, DiscoveryEngine, ReportFormat, Termination,
    generate_report,
};
use netcrawl_scanner::{FetcherConfig, HttpFetcher};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::commands::DEFAULT_SEED;

/// Everything the crawl handler needs, pulled out of the parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlArgs {
    pub seed: String,
    pub target: usize,
    pub timeout_secs: u64,
    pub max_pages: Option<usize>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub verbosity: u8,
}

impl CrawlArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let seed = matches
            .get_one::<String>("SEED")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SEED.to_string());

        let target = match matches.get_one::<u64>("target") {
            Some(&target) => usize::try_from(target).context("--target is too large")?,
            None => DEFAULT_TARGET,
        };

        let max_pages = matches
            .get_one::<u64>("max-pages")
            .map(|&max| usize::try_from(max).context("--max-pages is too large"))
            .transpose()?;

        let format_name = matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");
        let format = ReportFormat::from_str(format_name)
            .ok_or_else(|| anyhow!("Unknown report format '{}'", format_name))?;

        Ok(Self {
            seed,
            target,
            timeout_secs: matches.get_one::<u64>("timeout").copied().unwrap_or(10),
            max_pages,
            format,
            output: matches.get_one::<PathBuf>("output").cloned(),
            quiet: matches.get_flag("quiet"),
            verbosity: matches.get_count("verbose"),
        })
    }
}

/// Map `-v` occurrences to the most verbose level that is logged
pub fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so stdout carries nothing but the report.
pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level(verbosity))
        .init();
}

/// Write the report to `output`, or to stdout when no path is given
pub fn write_report(report: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, report)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(report.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write report to stdout")
        }
    }
}

fn crawl_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting crawl...");
    Ok(pb)
}

fn print_summary(args: &CrawlArgs, outcome: &CrawlOutcome) {
    let stats = &outcome.stats;
    eprintln!(
        "{} Crawl complete: {} pages fetched, {} fetch failures, {} hrefs skipped",
        "✓".green().bold(),
        stats.pages_fetched,
        stats.fetch_failures,
        stats.hrefs_skipped()
    );

    match outcome.termination {
        Termination::TargetReached => {}
        Termination::FrontierExhausted => eprintln!(
            "{} Ran out of links after {} of {} unique urls",
            "⚠".yellow().bold(),
            outcome.accepted.len(),
            args.target
        ),
        Termination::PageLimit => eprintln!(
            "{} Page limit reached after {} of {} unique urls",
            "⚠".yellow().bold(),
            outcome.accepted.len(),
            args.target
        ),
    }
    eprintln!();
}

pub async fn handle_crawl(args: CrawlArgs) -> Result<()> {
    let fetcher = HttpFetcher::with_config(FetcherConfig::with_timeout_secs(args.timeout_secs))
        .context("Failed to set up HTTP client")?;

    if !args.quiet {
        eprintln!("\n{} {}", "🕷️  Crawling".bright_cyan().bold(), args.seed.bright_white());
        eprintln!("Target: {} unique urls", args.target);
        eprintln!("Timeout: {}s per request", args.timeout_secs);
        if let Some(max_pages) = args.max_pages {
            eprintln!("Page limit: {}", max_pages);
        }
        eprintln!();
    }

    let mut engine = DiscoveryEngine::new(fetcher).with_target(args.target);
    if let Some(max_pages) = args.max_pages {
        engine = engine.with_max_pages(max_pages);
    }

    let spinner = if args.quiet { None } else { Some(crawl_spinner()?) };
    if let Some(ref pb) = spinner {
        let pb = pb.clone();
        engine = engine.with_progress_callback(Arc::new(move |progress: CrawlProgress| {
            pb.set_message(format!(
                "[{} found, {} queued] {}",
                progress.accepted, progress.frontier, progress.current
            ));
        }));
    }

    let outcome = engine.crawl(&args.seed).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
        print_summary(&args, &outcome);
    }

    let report = generate_report(&outcome.accepted, args.format);
    write_report(&report, args.output.as_deref())
}
