//! Per-directory counters collected during a run.
//!
//! Both maps start empty and only grow. Nothing here is persisted.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Moved and failed counts for one source directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub moved: usize,
    pub failed: usize,
}

impl SourceCounts {
    pub fn total(&self) -> usize {
        self.moved + self.failed
    }
}

/// Outcome counts keyed by the parent directory of each source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    dirs: HashMap<PathBuf, SourceCounts>,
}

impl SourceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful move of a file that lived in `dir`.
    pub fn record_moved(&mut self, dir: &Path) {
        self.entry(dir).moved += 1;
    }

    /// Records a failed attempt for a file that lived in `dir`.
    pub fn record_failed(&mut self, dir: &Path) {
        self.entry(dir).failed += 1;
    }

    fn entry(&mut self, dir: &Path) -> &mut SourceCounts {
        self.dirs.entry(dir.to_path_buf()).or_default()
    }

    pub fn get(&self, dir: &Path) -> Option<SourceCounts> {
        self.dirs.get(dir).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &SourceCounts)> {
        self.dirs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Sums the counters over every directory.
    pub fn totals(&self) -> SourceCounts {
        self.dirs
            .values()
            .fold(SourceCounts::default(), |acc, counts| SourceCounts {
                moved: acc.moved + counts.moved,
                failed: acc.failed + counts.failed,
            })
    }
}

/// Number of files moved into each destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStats {
    dirs: HashMap<PathBuf, usize>,
}

impl TargetStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_moved(&mut self, dir: &Path) {
        *self.dirs.entry(dir.to_path_buf()).or_insert(0) += 1;
    }

    pub fn get(&self, dir: &Path) -> Option<usize> {
        self.dirs.get(dir).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &usize)> {
        self.dirs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn total(&self) -> usize {
        self.dirs.values().sum()
    }
}
