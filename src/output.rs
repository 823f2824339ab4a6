//! Output formatting and styling module.
//!
//! Colored per-file lines, the progress bar and the final summary. The
//! organizer never prints; the CLI routes its events through here.

use crate::file_organizer::{FileEvent, FileOutcome, RunSummary};
use crate::report::Report;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one line describing what happened to a source entry.
    pub fn event(event: &FileEvent) {
        let path = event.path.display();
        match &event.outcome {
            FileOutcome::Moved { destination, kind } => {
                Self::success(&format!("{} -> {} [{}]", path, destination.display(), kind))
            }
            FileOutcome::Planned { destination, kind } => Self::dry_run_notice(&format!(
                "{} -> {} [{}]",
                path,
                destination.display(),
                kind
            )),
            FileOutcome::Failed(failure) => Self::error(&format!("{}: {}", path, failure)),
            FileOutcome::Skipped(reason) => {
                println!("{} {} ({})", "-".dimmed(), path.to_string().dimmed(), reason)
            }
        }
    }

    /// Creates a progress bar for `total` files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cardsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the end-of-run summary.
    pub fn summary(summary: &RunSummary) {
        let report = Report::new(&summary.source_stats, &summary.target_stats);
        if summary.dry_run {
            Self::header("SUMMARY (dry run, nothing was moved)");
        } else {
            Self::header("SUMMARY");
        }
        Self::plain(&report.render_text());

        let totals = report.totals();
        if summary.skipped > 0 {
            Self::plain(&format!("Skipped entries: {}", summary.skipped));
        }
        if totals.failed > 0 {
            Self::warning(&format!(
                "{} {} could not be organized. Review the errors above.",
                totals.failed,
                if totals.failed == 1 { "file" } else { "files" }
            ));
        } else {
            Self::success("Done.");
        }
    }
}
