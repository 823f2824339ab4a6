/// Media classification for files coming off a camera card.
///
/// Every file falls into exactly one of three buckets, decided purely by its
/// extension (compared case-insensitively). The bucket decides which folder
/// under the year directory the file lands in.
///
/// # Examples
///
/// ```
/// use cardsort::media_kind::MediaKind;
/// use std::path::Path;
///
/// assert_eq!(MediaKind::from_path(Path::new("IMG_0001.CR2")), MediaKind::Photo);
/// assert_eq!(MediaKind::from_path(Path::new("clip.MP4")), MediaKind::Video);
/// assert_eq!(MediaKind::from_path(Path::new("notes.txt")), MediaKind::Unknown);
/// ```
use chrono::{DateTime, Datelike, TimeZone};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions treated as photos, lowercase and without the leading dot.
pub const PHOTO_EXTENSIONS: &[&str] = &["raw", "cr2", "cr3", "jpg", "jpeg", "png", "tiff", "tif"];

/// Extensions treated as videos, lowercase and without the leading dot.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Folder name used for videos inside a year directory.
pub const VIDEO_DIR: &str = "video";

/// Folder name used for unclassified files inside a year directory.
pub const UNKNOWN_DIR: &str = "unknown";

/// The three mutually exclusive classification buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still images, RAW and processed.
    Photo,
    /// Video clips.
    Video,
    /// Anything else, including files without an extension.
    Unknown,
}

impl MediaKind {
    /// Classifies a bare extension (no leading dot).
    ///
    /// ```
    /// use cardsort::media_kind::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_extension("JPEG"), MediaKind::Photo);
    /// assert_eq!(MediaKind::from_extension("mkv"), MediaKind::Video);
    /// assert_eq!(MediaKind::from_extension("xmp"), MediaKind::Unknown);
    /// ```
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }

    /// Classifies a path by its final extension.
    ///
    /// Dotfiles such as `.hidden` have no extension and are `Unknown`.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(MediaKind::Unknown)
    }

    /// Returns the folder name this kind uses inside the year directory.
    ///
    /// Photos are split by month, so the name depends on the timestamp.
    pub fn subfolder<Tz: TimeZone>(&self, taken: &DateTime<Tz>) -> String {
        match self {
            MediaKind::Photo => format!("{:04}-{:02}", taken.year(), taken.month()),
            MediaKind::Video => VIDEO_DIR.to_string(),
            MediaKind::Unknown => UNKNOWN_DIR.to_string(),
        }
    }

    /// Computes `<target_base>/<YYYY>/<subfolder>` for a file of this kind.
    ///
    /// ```
    /// use cardsort::media_kind::MediaKind;
    /// use chrono::{TimeZone, Utc};
    /// use std::path::Path;
    ///
    /// let taken = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
    /// let folder = MediaKind::Photo.destination_folder(Path::new("/archive"), &taken);
    /// assert_eq!(folder, Path::new("/archive/2024/2024-03"));
    /// ```
    pub fn destination_folder<Tz: TimeZone>(
        &self,
        target_base: &Path,
        taken: &DateTime<Tz>,
    ) -> PathBuf {
        target_base
            .join(format!("{:04}", taken.year()))
            .join(self.subfolder(taken))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
