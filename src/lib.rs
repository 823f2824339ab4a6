//! cardsort - move camera card contents into a dated archive
//!
//! This library walks a source tree, classifies each file as a photo, video,
//! or unknown by extension, and moves it under
//! `<target>/<YYYY>/<YYYY-MM|video|unknown>/`. It tallies per-directory
//! statistics for a final report, loads optional TOML configuration, and
//! provides the CLI glue.

pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod media_kind;
pub mod output;
pub mod report;
pub mod stats;
pub mod timestamp;

pub use config::{CompiledFilters, Config, ConfigError};
pub use file_organizer::{
    FileEvent, FileFailure, FileOutcome, OrganizeError, OrganizeOptions, Organizer, RunStatus,
    RunSummary, SkipReason,
};
pub use media_kind::MediaKind;
pub use report::Report;
pub use stats::{SourceCounts, SourceStats, TargetStats};
pub use timestamp::TimestampSource;

pub use cli::{Args, run_cli};
