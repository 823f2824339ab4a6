/// Moves files from a source tree into a year/month destination tree.
///
/// A run happens in two passes. [`Organizer::scan`] walks the whole source
/// tree first, and [`Organizer::process`] then handles one file at a time:
/// read its timestamp, classify it, ensure the destination folder, move it,
/// tally the result. Per-file problems never abort the run. Each one is
/// reported as a [`FileOutcome`] and counted in the statistics.
use crate::config::CompiledFilters;
use crate::media_kind::MediaKind;
use crate::stats::{SourceStats, TargetStats};
use crate::timestamp::TimestampSource;
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Errors that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source path exists but is not a directory.
    #[error("Source is not a directory: {}", .path.display())]
    SourceNotDirectory { path: PathBuf },

    /// The source directory exists but cannot be read.
    #[error("Cannot read source directory {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Why a single file could not be moved. The file stays where it was.
#[derive(Debug, Error)]
pub enum FileFailure {
    #[error("could not read timestamp: {source}")]
    TimestampUnavailable {
        #[source]
        source: io::Error,
    },

    #[error("could not create {}: {source}", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file already exists at {}", .destination.display())]
    DestinationCollision { destination: PathBuf },

    #[error("could not move to {}: {source}", .destination.display())]
    MoveFailed {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why an entry was not considered for moving at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory, symlink, device, socket or similar.
    NotAFile,
    /// Matched an exclusion rule from the configuration.
    Excluded,
    /// The walker could not read the entry.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAFile => f.write_str("not a regular file"),
            SkipReason::Excluded => f.write_str("excluded by configuration"),
            SkipReason::Unreadable(reason) => write!(f, "unreadable: {}", reason),
        }
    }
}

/// What happened to one entry of the source tree.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file now lives at `destination`.
    Moved {
        destination: PathBuf,
        kind: MediaKind,
    },
    /// Dry run: the file would be moved to `destination`.
    Planned {
        destination: PathBuf,
        kind: MediaKind,
    },
    /// The attempt failed and the file was left in place.
    Failed(FileFailure),
    /// The entry was not attempted.
    Skipped(SkipReason),
}

impl FileOutcome {
    /// The destination path for moved or planned files.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            FileOutcome::Moved { destination, .. } | FileOutcome::Planned { destination, .. } => {
                Some(destination)
            }
            FileOutcome::Failed(_) | FileOutcome::Skipped(_) => None,
        }
    }
}

/// A per-entry notification delivered while a run is in progress.
#[derive(Debug)]
pub struct FileEvent {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Everything an [`Organizer`] needs to know about a run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub source: PathBuf,
    pub target_base: PathBuf,
    pub timestamp: TimestampSource,
    pub dry_run: bool,
    pub filters: CompiledFilters,
}

impl OrganizeOptions {
    /// Options with the default timestamp policy, no filters and no dry run.
    pub fn new(source: impl Into<PathBuf>, target_base: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target_base: target_base.into(),
            timestamp: TimestampSource::default(),
            dry_run: false,
            filters: CompiledFilters::none(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: TimestampSource) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// One entry found while walking the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    File(PathBuf),
    Skipped(PathBuf, SkipReason),
}

/// The source tree as it looked before anything was moved, in walk order.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    entries: Vec<ScanEntry>,
}

impl Scan {
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    /// Number of regular files that will be attempted.
    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, ScanEntry::File(_)))
            .count()
    }
}

/// How the run as a whole ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunStatus {
    /// The source was walked. Individual files may still have failed.
    #[default]
    Completed,
    /// The source directory does not exist. Nothing was walked or created.
    SourceMissing,
}

/// Statistics handed to the reporter at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub source_stats: SourceStats,
    pub target_stats: TargetStats,
    /// Entries that were not attempted (directories, excluded files, ...).
    pub skipped: usize,
    pub status: RunStatus,
    pub dry_run: bool,
}

/// Sorts a source tree into `<target>/<YYYY>/<YYYY-MM|video|unknown>/`.
pub struct Organizer {
    options: OrganizeOptions,
}

impl Organizer {
    pub fn new(options: OrganizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OrganizeOptions {
        &self.options
    }

    /// Scans and processes the source tree without per-file notifications.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cardsort::file_organizer::{OrganizeOptions, Organizer};
    ///
    /// let organizer = Organizer::new(OrganizeOptions::new("/media/card", "/archive"));
    /// match organizer.organize() {
    ///     Ok(summary) => println!("Moved {} files", summary.target_stats.total()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(&self) -> OrganizeResult<RunSummary> {
        self.organize_with(|_| {})
    }

    /// Like [`Organizer::organize`], calling `on_event` once per entry.
    pub fn organize_with<F>(&self, on_event: F) -> OrganizeResult<RunSummary>
    where
        F: FnMut(&FileEvent),
    {
        match self.scan()? {
            Some(scan) => Ok(self.process(scan, on_event)),
            None => Ok(self.source_missing()),
        }
    }

    /// Empty summary for a run whose source does not exist.
    pub fn source_missing(&self) -> RunSummary {
        warn!(source = %self.options.source.display(), "source directory does not exist");
        RunSummary {
            status: RunStatus::SourceMissing,
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        }
    }

    /// Walks the source tree and records every entry below the root.
    ///
    /// Returns `Ok(None)` if the source does not exist. A target directory
    /// that already exists inside the source is not descended into.
    pub fn scan(&self) -> OrganizeResult<Option<Scan>> {
        let source = &self.options.source;

        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OrganizeError::SourceUnreadable {
                    path: source.clone(),
                    source: e,
                });
            }
        };
        if !metadata.is_dir() {
            return Err(OrganizeError::SourceNotDirectory {
                path: source.clone(),
            });
        }
        fs::read_dir(source).map_err(|e| OrganizeError::SourceUnreadable {
            path: source.clone(),
            source: e,
        })?;

        let target_root = fs::canonicalize(&self.options.target_base).ok();
        let walker = WalkDir::new(source)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !is_target_root(entry, target_root.as_deref()));

        let mut scan = Scan::default();
        for entry in walker {
            match entry {
                Ok(entry) => scan.entries.push(self.classify_entry(&entry)),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| source.clone());
                    warn!(path = %path.display(), error = %err, "cannot read entry");
                    scan.entries
                        .push(ScanEntry::Skipped(path, SkipReason::Unreadable(err.to_string())));
                }
            }
        }

        debug!(
            entries = scan.entries.len(),
            files = scan.file_count(),
            "scan complete"
        );
        Ok(Some(scan))
    }

    fn classify_entry(&self, entry: &DirEntry) -> ScanEntry {
        let path = entry.path().to_path_buf();
        if !entry.file_type().is_file() {
            return ScanEntry::Skipped(path, SkipReason::NotAFile);
        }

        let relative = path.strip_prefix(&self.options.source).unwrap_or(&path);
        if self.options.filters.is_excluded(relative) {
            return ScanEntry::Skipped(path, SkipReason::Excluded);
        }

        ScanEntry::File(path)
    }

    /// Processes every scanned entry in order and returns the tallies.
    pub fn process<F>(&self, scan: Scan, mut on_event: F) -> RunSummary
    where
        F: FnMut(&FileEvent),
    {
        info!(
            source = %self.options.source.display(),
            target = %self.options.target_base.display(),
            dry_run = self.options.dry_run,
            "organizing"
        );

        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };
        let mut planned = HashSet::new();

        for entry in scan.entries {
            let (path, outcome) = match entry {
                ScanEntry::Skipped(path, reason) => {
                    debug!(path = %path.display(), %reason, "skipped");
                    summary.skipped += 1;
                    (path, FileOutcome::Skipped(reason))
                }
                ScanEntry::File(path) => {
                    let outcome = self.process_file(&path, &mut planned);
                    let parent = path.parent().unwrap_or_else(|| Path::new(""));
                    match &outcome {
                        FileOutcome::Moved { destination, .. }
                        | FileOutcome::Planned { destination, .. } => {
                            debug!(from = %path.display(), to = %destination.display(), "moved");
                            summary.source_stats.record_moved(parent);
                            if let Some(folder) = destination.parent() {
                                summary.target_stats.record_moved(folder);
                            }
                        }
                        FileOutcome::Failed(failure) => {
                            warn!(path = %path.display(), error = %failure, "not moved");
                            summary.source_stats.record_failed(parent);
                        }
                        FileOutcome::Skipped(_) => summary.skipped += 1,
                    }
                    (path, outcome)
                }
            };
            on_event(&FileEvent { path, outcome });
        }

        let totals = summary.source_stats.totals();
        info!(
            moved = totals.moved,
            failed = totals.failed,
            skipped = summary.skipped,
            "run complete"
        );
        summary
    }

    /// Runs the timestamp, classify, ensure-folder and move steps for one file.
    fn process_file(&self, path: &Path, planned: &mut HashSet<PathBuf>) -> FileOutcome {
        let taken = match fs::metadata(path).and_then(|m| self.options.timestamp.read(&m)) {
            Ok(taken) => taken,
            Err(source) => return FileOutcome::Failed(FileFailure::TimestampUnavailable { source }),
        };

        let kind = MediaKind::from_path(path);
        let folder = kind.destination_folder(&self.options.target_base, &taken);
        let Some(file_name) = path.file_name() else {
            return FileOutcome::Failed(FileFailure::MoveFailed {
                destination: folder,
                source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
            });
        };
        let destination = folder.join(file_name);

        if self.options.dry_run {
            if path_occupied(&destination) || !planned.insert(destination.clone()) {
                return FileOutcome::Failed(FileFailure::DestinationCollision { destination });
            }
            return FileOutcome::Planned { destination, kind };
        }

        if let Err(source) = ensure_directory(&folder) {
            return FileOutcome::Failed(FileFailure::DirectoryUnavailable {
                path: folder,
                source,
            });
        }

        match move_file(path, &destination) {
            Ok(()) => FileOutcome::Moved { destination, kind },
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                FileOutcome::Failed(FileFailure::DestinationCollision { destination })
            }
            Err(source) => FileOutcome::Failed(FileFailure::MoveFailed {
                destination,
                source,
            }),
        }
    }
}

fn is_target_root(entry: &DirEntry, target_root: Option<&Path>) -> bool {
    let Some(target_root) = target_root else {
        return false;
    };
    if !entry.file_type().is_dir() {
        return false;
    }
    let is_target = fs::canonicalize(entry.path()).is_ok_and(|path| path == target_root);
    if is_target {
        debug!(path = %entry.path().display(), "not descending into target directory");
    }
    is_target
}

/// True if anything, even a dangling symlink, occupies `path`.
fn path_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Creates `path` and any missing parents. Existing directories are fine.
pub fn ensure_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Moves `from` to `to` without replacing an existing file.
///
/// Renames when both paths are on the same filesystem. Across filesystems the
/// file is copied into a freshly created destination, checked for size, and
/// only then removed from the source.
///
/// The occupancy check and the rename are separate steps. A file that another
/// process creates at `to` in between is replaced by the rename on Unix. The
/// cross-filesystem copy opens `to` with `create_new` and has no such window.
///
/// # Errors
///
/// Returns `AlreadyExists` if `to` is occupied. On any error the source is
/// left in place and no partial destination remains.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if path_occupied(to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to),
        Err(e) => Err(e),
    }
}

/// Copy-and-delete fallback used when a rename crosses filesystems.
pub(crate) fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let mut reader = File::open(from)?;
    let source_metadata = reader.metadata()?;
    let expected = source_metadata.len();

    let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;
    let copied = io::copy(&mut reader, &mut writer).and_then(|copied| {
        writer.sync_all()?;
        Ok(copied)
    });
    drop(writer);

    match copied {
        Ok(copied) if copied == expected => {}
        Ok(copied) => {
            let _ = fs::remove_file(to);
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                expected, copied
            )));
        }
        Err(e) => {
            let _ = fs::remove_file(to);
            return Err(e);
        }
    }

    let _ = fs::set_permissions(to, source_metadata.permissions());

    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
