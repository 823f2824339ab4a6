//! End-of-run summary rendering.
//!
//! The reporter only reads the statistics. Rows are sorted by path so the
//! output is stable no matter how the maps iterate.

use crate::stats::{SourceCounts, SourceStats, TargetStats};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct SourceRow {
    directory: PathBuf,
    moved: usize,
    failed: usize,
}

#[derive(Debug, Serialize)]
struct TargetRow {
    directory: PathBuf,
    files_moved: usize,
}

/// A sorted, read-only view over the two statistics maps.
#[derive(Debug, Serialize)]
pub struct Report {
    sources: Vec<SourceRow>,
    targets: Vec<TargetRow>,
    totals: SourceCounts,
}

impl Report {
    pub fn new(source_stats: &SourceStats, target_stats: &TargetStats) -> Self {
        let mut sources: Vec<SourceRow> = source_stats
            .iter()
            .map(|(dir, counts)| SourceRow {
                directory: dir.clone(),
                moved: counts.moved,
                failed: counts.failed,
            })
            .collect();
        sources.sort_by(|a, b| a.directory.cmp(&b.directory));

        let mut targets: Vec<TargetRow> = target_stats
            .iter()
            .map(|(dir, count)| TargetRow {
                directory: dir.clone(),
                files_moved: *count,
            })
            .collect();
        targets.sort_by(|a, b| a.directory.cmp(&b.directory));

        Self {
            sources,
            targets,
            totals: source_stats.totals(),
        }
    }

    pub fn totals(&self) -> SourceCounts {
        self.totals
    }

    /// Plain-text summary, one block per directory.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Source Directory Summary:");
        if self.sources.is_empty() {
            let _ = writeln!(out, "  (no files processed)");
        }
        for row in &self.sources {
            let _ = writeln!(out, "Directory: {}", row.directory.display());
            let _ = writeln!(out, "  Moved files: {}", row.moved);
            let _ = writeln!(out, "  Failed files: {}", row.failed);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Target Directory Summary:");
        if self.targets.is_empty() {
            let _ = writeln!(out, "  (no files moved)");
        }
        for row in &self.targets {
            let _ = writeln!(out, "Target Directory: {}", row.directory.display());
            let _ = writeln!(out, "  Total files moved: {}", row.files_moved);
        }

        let _ = writeln!(out);
        let _ = write!(
            out,
            "Total: {} moved, {} failed",
            self.totals.moved, self.totals.failed
        );
        out
    }

    /// Pretty JSON with the same content as [`Report::render_text`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
