//! Which file timestamp decides where a file is filed.
//!
//! Not every filesystem records a birth time. FAT and exFAT cards do, but
//! plenty of Linux setups don't expose it. `Created` falls back in that case
//! to the metadata-change time, which is what `st_ctime` gives on Unix.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

/// Last year that still fits a four-digit folder name.
const MAX_YEAR: i32 = 9999;

/// Timestamp policy used to pick a file's year and month.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// Birth time, falling back to the metadata-change time.
    #[default]
    Created,
    /// Last content modification time.
    Modified,
    /// Metadata-change time (`st_ctime`). Modification time off Unix.
    Changed,
}

impl TimestampSource {
    /// Reads the configured timestamp from `metadata` as local calendar time.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot report the requested time, or
    /// if the time falls outside years 0 to 9999.
    pub fn read(&self, metadata: &Metadata) -> io::Result<DateTime<Local>> {
        match self {
            TimestampSource::Created => match metadata.created() {
                Ok(time) => to_local(time),
                Err(_) => changed_time(metadata),
            },
            TimestampSource::Modified => metadata.modified().and_then(to_local),
            TimestampSource::Changed => changed_time(metadata),
        }
    }
}

fn to_local(time: SystemTime) -> io::Result<DateTime<Local>> {
    let utc = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, after.subsec_nanos())),
        Err(err) => {
            let before = err.duration();
            i64::try_from(before.as_secs()).ok().and_then(|secs| {
                match before.subsec_nanos() {
                    0 => DateTime::from_timestamp(-secs, 0),
                    nanos => DateTime::from_timestamp(-secs - 1, 1_000_000_000 - nanos),
                }
            })
        }
    };
    to_calendar(utc)
}

/// Rejects times chrono cannot hold and years that need more than four digits.
fn to_calendar(utc: Option<DateTime<Utc>>) -> io::Result<DateTime<Local>> {
    utc.filter(|utc| (0..=MAX_YEAR).contains(&utc.year()))
        .map(|utc| utc.with_timezone(&Local))
        .filter(|local| (0..=MAX_YEAR).contains(&local.year()))
        .ok_or_else(|| io::Error::other("timestamp out of range"))
}

#[cfg(unix)]
fn changed_time(metadata: &Metadata) -> io::Result<DateTime<Local>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    to_calendar(DateTime::from_timestamp(metadata.ctime(), nanos))
}

#[cfg(not(unix))]
fn changed_time(metadata: &Metadata) -> io::Result<DateTime<Local>> {
    metadata.modified().and_then(to_local)
}
