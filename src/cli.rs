//! Command-line interface module for cardsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and the built-in default target
//! - Merging flags with the configuration file
//! - Logging setup
//! - Running the organizer and printing its events and summary
//! - Mapping the run outcome to an exit code

use crate::config::{Config, ConfigError};
use crate::file_organizer::{
    FileOutcome, OrganizeError, OrganizeOptions, Organizer, RunStatus, RunSummary,
};
use crate::output::OutputFormatter;
use crate::report::Report;
use crate::timestamp::TimestampSource;
use clap::{ArgAction, Parser};
use indicatif::ProgressBar;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Target used when neither `--target` nor the config file names one.
pub const DEFAULT_TARGET_BASE_DIR: &str = "/Volumes/RED/00_photo_raw";

/// Exit code for a source directory that does not exist.
pub const EXIT_SOURCE_MISSING: u8 = 2;

#[derive(Parser, Debug, Clone)]
#[command(name = "cardsort")]
#[command(author, version, about = "Organize photos and videos from memory cards.", long_about = None)]
pub struct Args {
    /// Source directory (e.g., memory card path)
    pub source: PathBuf,

    /// Target base directory for organized files [default: /Volumes/RED/00_photo_raw]
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Configuration file (defaults to ./.cardsortrc.toml, then ~/.config/cardsort/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Which file timestamp decides the year and month
    #[arg(long, value_enum)]
    pub timestamp: Option<TimestampSource>,

    /// Show where files would go without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the summary as JSON (implies --quiet)
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Errors that end the CLI before or instead of a summary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error("Could not render JSON summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Installs a stderr tracing subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "cardsort=error",
        1 => "cardsort=info",
        _ => "cardsort=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merges command-line flags over the configuration file.
///
/// Flags take precedence, then the config file, then built-in defaults.
///
/// # Errors
///
/// Returns an error if the configured filters do not compile.
pub fn resolve_options(args: &Args, config: &Config) -> Result<OrganizeOptions, CliError> {
    let target = args
        .target
        .clone()
        .or_else(|| config.target_base.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_BASE_DIR));
    let timestamp = args.timestamp.or(config.timestamp).unwrap_or_default();
    let filters = config.filters.compile()?;

    Ok(OrganizeOptions::new(args.source.clone(), target)
        .with_timestamp(timestamp)
        .with_dry_run(args.dry_run)
        .with_filters(filters))
}

/// Runs one organization pass as described by `args`.
///
/// # Examples
///
/// ```no_run
/// use cardsort::cli::{run_cli, Args};
/// use clap::Parser;
///
/// let args = Args::parse_from(["cardsort", "/media/card", "--target", "/archive"]);
/// match run_cli(&args) {
///     Ok(summary) => println!("{} files moved", summary.target_stats.total()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<RunSummary, CliError> {
    let config = Config::load(args.config.as_deref())?;
    let options = resolve_options(args, &config)?;
    let quiet = args.quiet || args.json;

    if !quiet {
        let mode = if options.dry_run { "Analyzing" } else { "Organizing" };
        OutputFormatter::info(&format!(
            "{} {} into {}",
            mode,
            options.source.display(),
            options.target_base.display()
        ));
    }

    let organizer = Organizer::new(options);
    let summary = match organizer.scan()? {
        Some(scan) => {
            let pb = if quiet || !std::io::stdout().is_terminal() {
                ProgressBar::hidden()
            } else {
                OutputFormatter::create_progress_bar(scan.file_count() as u64)
            };
            let show_skipped = args.verbose > 0;

            let summary = organizer.process(scan, |event| {
                let skipped = matches!(event.outcome, FileOutcome::Skipped(_));
                if !quiet && (!skipped || show_skipped) {
                    pb.suspend(|| OutputFormatter::event(event));
                }
                if !skipped {
                    pb.inc(1);
                }
            });
            pb.finish_and_clear();
            summary
        }
        None => {
            OutputFormatter::error(&format!(
                "Source directory {} does not exist.",
                organizer.options().source.display()
            ));
            organizer.source_missing()
        }
    };

    if args.json {
        let report = Report::new(&summary.source_stats, &summary.target_stats);
        OutputFormatter::plain(&report.to_json()?);
    } else {
        OutputFormatter::summary(&summary);
    }

    Ok(summary)
}

/// Exit status for a finished run. Per-file failures still count as success.
pub fn exit_status(summary: &RunSummary) -> u8 {
    match summary.status {
        RunStatus::Completed => 0,
        RunStatus::SourceMissing => EXIT_SOURCE_MISSING,
    }
}

pub fn exit_code(summary: &RunSummary) -> ExitCode {
    ExitCode::from(exit_status(summary))
}
