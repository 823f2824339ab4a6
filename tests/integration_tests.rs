use cardsort::cli::{self, Args, run_cli};
/// Integration tests for cardsort
///
/// These tests simulate real camera cards in a temporary directory and check
/// the complete scan, classify, move and tally flow.
///
/// Test categories:
/// 1. Placement scenarios
/// 2. Collisions and the no-overwrite rule
/// 3. Statistics accounting
/// 4. Missing and invalid sources
/// 5. CLI wiring (config file, dry run, JSON)
use cardsort::file_organizer::{OrganizeOptions, Organizer, RunStatus};
use cardsort::media_kind::{PHOTO_EXTENSIONS, VIDEO_EXTENSIONS};
use cardsort::timestamp::TimestampSource;
use chrono::{TimeZone, Utc};
use clap::Parser;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary card directory plus a sibling archive directory.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("card")).expect("Failed to create card directory");
        TestFixture { temp_dir }
    }

    fn card(&self) -> PathBuf {
        self.temp_dir.path().join("card")
    }

    fn archive(&self) -> PathBuf {
        self.temp_dir.path().join("archive")
    }

    /// Create a file on the card with its mtime pinned to noon UTC on the given day.
    fn create_card_file(&self, rel_path: &str, content: &[u8], ymd: (i32, u32, u32)) -> PathBuf {
        let path = self.card().join(rel_path);
        write_pinned(&path, content, ymd);
        path
    }

    /// Create a file that already sits in the archive.
    fn create_archive_file(&self, rel_path: &str, content: &[u8]) -> PathBuf {
        let path = self.archive().join(rel_path);
        write_pinned(&path, content, (2020, 1, 1));
        path
    }

    fn organizer(&self) -> Organizer {
        Organizer::new(
            OrganizeOptions::new(self.card(), self.archive())
                .with_timestamp(TimestampSource::Modified),
        )
    }

    fn assert_archived(&self, rel_path: &str) {
        let path = self.archive().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_on_card(&self, rel_path: &str) {
        let path = self.card().join(rel_path);
        assert!(path.is_file(), "File should still exist: {}", path.display());
    }

    fn assert_not_on_card(&self, rel_path: &str) {
        let path = self.card().join(rel_path);
        assert!(!path.exists(), "File should have moved: {}", path.display());
    }

    /// Write a config file next to the card and return its path.
    fn write_config(&self, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join("cardsort.toml");
        fs::write(&path, content).expect("Failed to write config");
        path
    }
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

fn parse_args(argv: Vec<String>) -> Args {
    Args::parse_from(std::iter::once("cardsort".to_string()).chain(argv))
}

fn write_pinned(path: &Path, content: &[u8], (year, month, day): (i32, u32, u32)) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
    let when = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(when.timestamp(), 0))
        .expect("Failed to set mtime");
}

// ============================================================================
// Test Suite 1: Placement
// ============================================================================

#[test]
fn test_photo_goes_to_month_folder() {
    let fixture = TestFixture::new();
    fixture.create_card_file("IMG_0001.CR2", b"raw", (2024, 3, 15));

    let summary = fixture.organizer().organize().unwrap();

    fixture.assert_archived("2024/2024-03/IMG_0001.CR2");
    fixture.assert_not_on_card("IMG_0001.CR2");
    assert_eq!(summary.source_stats.get(&fixture.card()).unwrap().moved, 1);
}

#[test]
fn test_video_goes_to_video_folder() {
    let fixture = TestFixture::new();
    fixture.create_card_file("clip.MP4", b"mp4", (2023, 12, 1));

    fixture.organizer().organize().unwrap();

    fixture.assert_archived("2023/video/clip.MP4");
    fixture.assert_not_on_card("clip.MP4");
}

#[test]
fn test_other_files_go_to_unknown_folder() {
    let fixture = TestFixture::new();
    fixture.create_card_file("notes.txt", b"hello", (2022, 7, 4));
    fixture.create_card_file("README", b"no extension", (2022, 7, 4));

    fixture.organizer().organize().unwrap();

    fixture.assert_archived("2022/unknown/notes.txt");
    fixture.assert_archived("2022/unknown/README");
}

#[test]
fn test_every_supported_extension_placement() {
    let fixture = TestFixture::new();
    for ext in PHOTO_EXTENSIONS {
        fixture.create_card_file(&format!("photo.{}", ext.to_uppercase()), b"p", (2024, 5, 9));
    }
    for ext in VIDEO_EXTENSIONS {
        fixture.create_card_file(&format!("video.{}", ext), b"v", (2024, 5, 9));
    }

    let summary = fixture.organizer().organize().unwrap();

    for ext in PHOTO_EXTENSIONS {
        fixture.assert_archived(&format!("2024/2024-05/photo.{}", ext.to_uppercase()));
    }
    for ext in VIDEO_EXTENSIONS {
        fixture.assert_archived(&format!("2024/video/video.{}", ext));
    }
    assert_eq!(
        summary.target_stats.get(&fixture.archive().join("2024/2024-05")),
        Some(PHOTO_EXTENSIONS.len())
    );
    assert_eq!(
        summary.target_stats.get(&fixture.archive().join("2024/video")),
        Some(VIDEO_EXTENSIONS.len())
    );
}

#[test]
fn test_nested_card_layout_is_flattened_by_date() {
    let fixture = TestFixture::new();
    fixture.create_card_file("DCIM/100CANON/IMG_0001.JPG", b"a", (2024, 1, 10));
    fixture.create_card_file("DCIM/101CANON/IMG_0002.JPG", b"b", (2024, 2, 10));
    fixture.create_card_file("PRIVATE/M4ROOT/CLIP/C0001.MP4", b"c", (2024, 2, 11));

    let summary = fixture.organizer().organize().unwrap();

    fixture.assert_archived("2024/2024-01/IMG_0001.JPG");
    fixture.assert_archived("2024/2024-02/IMG_0002.JPG");
    fixture.assert_archived("2024/video/C0001.MP4");

    let dcim_100 = fixture.card().join("DCIM/100CANON");
    let clip_dir = fixture.card().join("PRIVATE/M4ROOT/CLIP");
    assert_eq!(summary.source_stats.get(&dcim_100).unwrap().moved, 1);
    assert_eq!(summary.source_stats.get(&clip_dir).unwrap().moved, 1);
    assert_eq!(summary.source_stats.len(), 3);
    // Directories remain on the card, emptied.
    assert!(dcim_100.is_dir());
}

#[test]
fn test_moving_preserves_content() {
    let fixture = TestFixture::new();
    let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    fixture.create_card_file("IMG_0042.JPG", &content, (2024, 3, 15));

    fixture.organizer().organize().unwrap();

    let moved = fs::read(fixture.archive().join("2024/2024-03/IMG_0042.JPG")).unwrap();
    assert_eq!(moved, content);
}

// ============================================================================
// Test Suite 2: Collisions
// ============================================================================

#[test]
fn test_existing_destination_is_never_overwritten() {
    let fixture = TestFixture::new();
    let existing = fixture.create_archive_file("2024/2024-03/IMG_0001.CR2", b"already archived");
    fixture.create_card_file("IMG_0001.CR2", b"new shot", (2024, 3, 15));

    let summary = fixture.organizer().organize().unwrap();

    fixture.assert_on_card("IMG_0001.CR2");
    assert_eq!(fs::read(&existing).unwrap(), b"already archived");
    assert_eq!(fs::read(fixture.card().join("IMG_0001.CR2")).unwrap(), b"new shot");

    let counts = summary.source_stats.get(&fixture.card()).unwrap();
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.moved, 0);
    assert!(summary.target_stats.is_empty());
}

#[test]
fn test_same_name_from_two_folders_only_first_moves() {
    let fixture = TestFixture::new();
    fixture.create_card_file("A/IMG_0001.JPG", b"first", (2024, 3, 15));
    fixture.create_card_file("B/IMG_0001.JPG", b"second", (2024, 3, 16));

    let summary = fixture.organizer().organize().unwrap();

    let totals = summary.source_stats.totals();
    assert_eq!(totals.moved, 1);
    assert_eq!(totals.failed, 1);

    let archived = fs::read(fixture.archive().join("2024/2024-03/IMG_0001.JPG")).unwrap();
    let left_on_card = if fixture.card().join("A/IMG_0001.JPG").exists() {
        fs::read(fixture.card().join("A/IMG_0001.JPG")).unwrap()
    } else {
        fs::read(fixture.card().join("B/IMG_0001.JPG")).unwrap()
    };
    assert_ne!(archived, left_on_card);
}

#[test]
fn test_rerun_after_copying_back_counts_collisions() {
    let fixture = TestFixture::new();
    fixture.create_card_file("IMG_0001.JPG", b"x", (2024, 3, 15));
    fixture.organizer().organize().unwrap();

    fixture.create_card_file("IMG_0001.JPG", b"x", (2024, 3, 15));
    let second = fixture.organizer().organize().unwrap();

    assert_eq!(second.source_stats.totals().failed, 1);
    fixture.assert_on_card("IMG_0001.JPG");
}

// ============================================================================
// Test Suite 3: Accounting
// ============================================================================

#[test]
fn test_every_file_is_moved_or_failed_exactly_once() {
    let fixture = TestFixture::new();
    fixture.create_archive_file("2024/2024-03/DUP.JPG", b"taken");
    fixture.create_card_file("DCIM/DUP.JPG", b"dup", (2024, 3, 15));
    fixture.create_card_file("DCIM/A.JPG", b"a", (2024, 3, 15));
    fixture.create_card_file("DCIM/B.MOV", b"b", (2024, 3, 15));
    fixture.create_card_file("MISC/C.XML", b"c", (2024, 3, 15));
    fs::create_dir_all(fixture.card().join("EMPTY")).unwrap();

    let summary = fixture.organizer().organize().unwrap();

    let totals = summary.source_stats.totals();
    assert_eq!(totals.total(), 4, "four regular files were on the card");
    assert_eq!(totals.moved, 3);
    assert_eq!(totals.failed, 1);
    assert_eq!(summary.target_stats.total(), totals.moved);
    // DCIM, MISC and EMPTY are directories.
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.status, RunStatus::Completed);
}

#[test]
fn test_unusable_year_folder_fails_only_that_year() {
    let fixture = TestFixture::new();
    fs::create_dir_all(fixture.archive()).unwrap();
    fs::write(fixture.archive().join("2023"), b"stray file").unwrap();
    fixture.create_card_file("DCIM/OLD.JPG", b"old", (2023, 8, 1));
    fixture.create_card_file("DCIM/NEW.JPG", b"new", (2024, 3, 15));

    let summary = fixture.organizer().organize().unwrap();

    let counts = summary.source_stats.get(&fixture.card().join("DCIM")).unwrap();
    assert_eq!(counts.moved, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(summary.target_stats.len(), 1);
    fixture.assert_on_card("DCIM/OLD.JPG");
    fixture.assert_not_on_card("DCIM/NEW.JPG");
    fixture.assert_archived("2024/2024-03/NEW.JPG");
}

#[test]
fn test_empty_card() {
    let fixture = TestFixture::new();

    let summary = fixture.organizer().organize().unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert!(summary.source_stats.is_empty());
    assert!(summary.target_stats.is_empty());
    assert!(!fixture.archive().exists());
}

// ============================================================================
// Test Suite 4: Missing and invalid sources
// ============================================================================

#[test]
fn test_missing_source_yields_empty_stats_and_creates_nothing() {
    let fixture = TestFixture::new();
    let missing = fixture.temp_dir.path().join("not-mounted");
    let organizer = Organizer::new(OrganizeOptions::new(&missing, fixture.archive()));

    let summary = organizer.organize().unwrap();

    assert_eq!(summary.status, RunStatus::SourceMissing);
    assert!(summary.source_stats.is_empty());
    assert!(summary.target_stats.is_empty());
    assert!(!fixture.archive().exists());
}

#[test]
fn test_missing_source_exit_code() {
    let fixture = TestFixture::new();
    let missing = fixture.temp_dir.path().join("not-mounted");
    let config = fixture.write_config("");
    let args = parse_args(vec![
        arg(&missing),
        "--target".to_string(),
        arg(&fixture.archive()),
        "--config".to_string(),
        arg(&config),
        "--quiet".to_string(),
    ]);

    let summary = run_cli(&args).unwrap();

    assert_eq!(cli::exit_status(&summary), cli::EXIT_SOURCE_MISSING);
    assert!(!fixture.archive().exists());
}

#[test]
fn test_file_as_source_is_an_error() {
    let fixture = TestFixture::new();
    let file = fixture.create_card_file("IMG_0001.JPG", b"x", (2024, 3, 15));
    let organizer = Organizer::new(OrganizeOptions::new(&file, fixture.archive()));

    assert!(organizer.organize().is_err());
    assert!(file.exists());
}

// ============================================================================
// Test Suite 5: CLI wiring
// ============================================================================

#[test]
fn test_cli_uses_config_target_and_filters() {
    let fixture = TestFixture::new();
    fixture.create_card_file("DCIM/MVI_0001.MOV", b"mov", (2024, 3, 15));
    fixture.create_card_file("DCIM/MVI_0001.THM", b"thumb", (2024, 3, 15));
    fixture.create_card_file(".Trashes", b"os litter", (2024, 3, 15));
    let config = fixture.write_config(&format!(
        r#"
target_base = '{}'
timestamp = "modified"

[filters]
skip_hidden = true

[filters.exclude]
extensions = ["thm"]
"#,
        fixture.archive().display()
    ));

    let args = parse_args(vec![
        arg(&fixture.card()),
        "--config".to_string(),
        arg(&config),
        "--quiet".to_string(),
    ]);
    let summary = run_cli(&args).unwrap();

    fixture.assert_archived("2024/video/MVI_0001.MOV");
    fixture.assert_on_card("DCIM/MVI_0001.THM");
    fixture.assert_on_card(".Trashes");
    assert_eq!(summary.source_stats.totals().total(), 1);
    assert_eq!(cli::exit_status(&summary), 0);
}

#[test]
fn test_cli_dry_run_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_card_file("IMG_0001.JPG", b"x", (2024, 3, 15));
    fixture.create_card_file("clip.mov", b"y", (2024, 3, 15));
    let config = fixture.write_config("");

    let args = parse_args(vec![
        arg(&fixture.card()),
        "--target".to_string(),
        arg(&fixture.archive()),
        "--config".to_string(),
        arg(&config),
        "--timestamp".to_string(),
        "modified".to_string(),
        "--dry-run".to_string(),
        "--json".to_string(),
    ]);
    let summary = run_cli(&args).unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.source_stats.totals().moved, 2);
    assert_eq!(
        summary.target_stats.get(&fixture.archive().join("2024/2024-03")),
        Some(1)
    );
    fixture.assert_on_card("IMG_0001.JPG");
    fixture.assert_on_card("clip.mov");
    assert!(!fixture.archive().exists());
}

#[test]
fn test_cli_failures_still_exit_zero() {
    let fixture = TestFixture::new();
    fixture.create_archive_file("2024/2024-03/IMG_0001.JPG", b"old");
    fixture.create_card_file("IMG_0001.JPG", b"new", (2024, 3, 15));
    let config = fixture.write_config("timestamp = \"modified\"");

    let args = parse_args(vec![
        arg(&fixture.card()),
        "-t".to_string(),
        arg(&fixture.archive()),
        "-c".to_string(),
        arg(&config),
        "-q".to_string(),
    ]);
    let summary = run_cli(&args).unwrap();

    assert_eq!(summary.source_stats.totals().failed, 1);
    assert_eq!(cli::exit_status(&summary), 0);
}

#[test]
fn test_cli_invalid_config_is_an_error() {
    let fixture = TestFixture::new();
    let config = fixture.write_config("timestamp = \"sometime\"");

    let args = parse_args(vec![
        arg(&fixture.card()),
        "--config".to_string(),
        arg(&config),
        "--quiet".to_string(),
    ]);

    assert!(matches!(run_cli(&args), Err(cli::CliError::Config(_))));
}
