//! Integration tests for tarhl-core.
//!
//! These tests run the full walker/writer pipeline against real
//! temporary directories.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use filetime::FileTime;
use std::fs;
use std::io::Cursor;
use std::os::unix::fs::MetadataExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tarhl_core::ExtractConfig;
use tarhl_core::ExtractionError;
use tarhl_core::MissingBasePolicy;
use tarhl_core::ProgressCallback;
use tarhl_core::extract_archive;
use tarhl_core::extract_archive_with_progress;
use tarhl_core::test_utils::TarTestBuilder;
use tempfile::TempDir;

const T: u64 = 1_650_000_000;

fn sample_archive() -> Vec<u8> {
    TarTestBuilder::new()
        .add_directory("a/")
        .add_file_with("a/x.txt", b"0123456789", 0o644, T)
        .build()
}

fn seed(path: &Path, content: &[u8], mode: u32, mtime: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(mtime as i64, 0)).unwrap();
}

fn mtime_of(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

struct Dirs {
    _temp: TempDir,
    dest: PathBuf,
    base: PathBuf,
}

fn dirs() -> Dirs {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("dest");
    let base = temp.path().join("base");
    fs::create_dir(&base).unwrap();
    Dirs {
        _temp: temp,
        dest,
        base,
    }
}

#[test]
fn test_extract_without_base() {
    let d = dirs();
    let report = extract_archive(Cursor::new(sample_archive()), &ExtractConfig::new(&d.dest))
        .unwrap();

    assert!(d.dest.join("a").is_dir());
    let file = d.dest.join("a/x.txt");
    let meta = fs::metadata(&file).unwrap();
    assert_eq!(fs::read(&file).unwrap(), b"0123456789");
    assert_eq!(meta.mode() & 0o777, 0o644);
    assert_eq!(meta.nlink(), 1);
    assert_eq!(mtime_of(&file), FileTime::from_unix_time(T as i64, 0));

    assert_eq!(report.summary_line(), "Written: 1 files, linked: 0 files");
    assert_eq!(report.directories_created, 1);
    assert_eq!(report.bytes_written, 10);
}

#[test]
fn test_identical_base_file_is_linked() {
    let d = dirs();
    let pair = d.base.join("a/x.txt");
    seed(&pair, b"0123456789", 0o644, T);

    let config = ExtractConfig::new(&d.dest).with_base(&d.base);
    let report = extract_archive(Cursor::new(sample_archive()), &config).unwrap();

    let dest_meta = fs::metadata(d.dest.join("a/x.txt")).unwrap();
    let pair_meta = fs::metadata(&pair).unwrap();
    assert_eq!(dest_meta.ino(), pair_meta.ino());
    assert_eq!(dest_meta.dev(), pair_meta.dev());
    assert_eq!(pair_meta.nlink(), 2);

    assert_eq!(report.summary_line(), "Written: 0 files, linked: 1 files");
    assert_eq!(report.bytes_written, 0);
    assert_eq!(report.bytes_linked, 10);
}

#[test]
fn test_base_file_with_different_mtime_is_rewritten() {
    let d = dirs();
    let pair = d.base.join("a/x.txt");
    seed(&pair, b"0123456789", 0o644, T + 60);

    let config = ExtractConfig::new(&d.dest).with_base(&d.base);
    let report = extract_archive(Cursor::new(sample_archive()), &config).unwrap();

    let file = d.dest.join("a/x.txt");
    assert_ne!(
        fs::metadata(&file).unwrap().ino(),
        fs::metadata(&pair).unwrap().ino()
    );
    assert_eq!(fs::read(&file).unwrap(), b"0123456789");
    assert_eq!(mtime_of(&file), FileTime::from_unix_time(T as i64, 0));
    assert_eq!(report.summary_line(), "Written: 1 files, linked: 0 files");
}

#[test]
fn test_base_file_with_different_size_or_mode_is_rewritten() {
    for (content, mode) in [(&b"012345678"[..], 0o644), (&b"0123456789"[..], 0o755)] {
        let d = dirs();
        let pair = d.base.join("a/x.txt");
        seed(&pair, content, mode, T);

        let config = ExtractConfig::new(&d.dest).with_base(&d.base);
        let report = extract_archive(Cursor::new(sample_archive()), &config).unwrap();

        assert_eq!(report.files_written, 1);
        assert_eq!(report.files_linked, 0);
        assert_eq!(fs::metadata(d.dest.join("a/x.txt")).unwrap().nlink(), 1);
    }
}

#[test]
fn test_missing_base_file_is_fatal_by_default() {
    let d = dirs();
    let config = ExtractConfig::new(&d.dest).with_base(&d.base);

    let err = extract_archive(Cursor::new(sample_archive()), &config).unwrap_err();

    assert!(matches!(err, ExtractionError::StatPair { .. }));
    assert_eq!(err.path(), Some(d.base.join("a/x.txt").as_path()));
    // The directory entry was processed before the failure.
    assert!(d.dest.join("a").is_dir());
    assert!(!d.dest.join("a/x.txt").exists());
}

#[test]
fn test_missing_base_file_written_fresh_when_allowed() {
    let d = dirs();
    let config = ExtractConfig::new(&d.dest)
        .with_base(&d.base)
        .with_missing_base(MissingBasePolicy::WriteFresh);

    let report = extract_archive(Cursor::new(sample_archive()), &config).unwrap();
    assert_eq!(report.summary_line(), "Written: 1 files, linked: 0 files");
}

#[test]
fn test_mixed_archive_counts_add_up() {
    let d = dirs();
    seed(&d.base.join("same.txt"), b"same", 0o644, T);
    seed(&d.base.join("changed.txt"), b"old!", 0o644, T);
    seed(&d.base.join("dir/deep.txt"), b"deep", 0o600, T);

    let data = TarTestBuilder::new()
        .add_file_with("same.txt", b"same", 0o644, T)
        .add_file_with("changed.txt", b"new!", 0o644, T + 1)
        .add_directory("dir/")
        .add_file_with("dir/deep.txt", b"deep", 0o600, T)
        .add_symlink("dir/link", "deep.txt")
        .add_hardlink("dir/hard", "dir/deep.txt")
        .add_fifo("pipe")
        .build();

    let config = ExtractConfig::new(&d.dest).with_base(&d.base);
    let report = extract_archive(Cursor::new(data), &config).unwrap();

    assert_eq!(report.files_linked, 2);
    assert_eq!(report.files_written, 1);
    assert_eq!(report.total_files(), 3);
    assert_eq!(report.directories_created, 1);
    assert_eq!(report.symlinks_created, 1);
    assert_eq!(report.entries_skipped, 2);

    assert_eq!(fs::read(d.dest.join("changed.txt")).unwrap(), b"new!");
    assert_eq!(fs::read(d.dest.join("dir/link")).unwrap(), b"deep");
    assert!(!d.dest.join("dir/hard").exists());
    assert!(!d.dest.join("pipe").exists());
}

#[test]
fn test_directory_mode_applied() {
    let d = dirs();
    let data = TarTestBuilder::new()
        .add_directory_with_mode("private/", 0o700)
        .add_file("private/secret", b"s")
        .build();

    extract_archive(Cursor::new(data), &ExtractConfig::new(&d.dest)).unwrap();
    let mode = fs::metadata(d.dest.join("private")).unwrap().mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[test]
fn test_many_files_through_small_queue() {
    let d = dirs();
    let mut builder = TarTestBuilder::new().add_directory("bulk/");
    for i in 0..250 {
        builder = builder.add_file_with(&format!("bulk/{i:03}.dat"), format!("{i}").as_bytes(), 0o644, T);
    }

    let config = ExtractConfig::new(&d.dest).with_queue_capacity(3);
    let report = extract_archive(Cursor::new(builder.build()), &config).unwrap();

    assert_eq!(report.files_written, 250);
    assert_eq!(fs::read_dir(d.dest.join("bulk")).unwrap().count(), 250);
    assert_eq!(fs::read(d.dest.join("bulk/249.dat")).unwrap(), b"249");
}

#[test]
fn test_second_snapshot_links_against_first() {
    let temp = TempDir::new().unwrap();
    let monday = temp.path().join("monday");
    let tuesday = temp.path().join("tuesday");

    let first = TarTestBuilder::new()
        .add_directory("etc/")
        .add_file_with("etc/hosts", b"127.0.0.1 localhost\n", 0o644, T)
        .add_file_with("etc/motd", b"hello\n", 0o644, T)
        .build();
    let second = TarTestBuilder::new()
        .add_directory("etc/")
        .add_file_with("etc/hosts", b"127.0.0.1 localhost\n", 0o644, T)
        .add_file_with("etc/motd", b"goodbye\n", 0o644, T + 86_400)
        .build();

    let report = extract_archive(Cursor::new(first), &ExtractConfig::new(&monday)).unwrap();
    assert_eq!(report.files_written, 2);

    let config = ExtractConfig::new(&tuesday).with_base(&monday);
    let report = extract_archive(Cursor::new(second), &config).unwrap();
    assert_eq!(report.files_linked, 1);
    assert_eq!(report.files_written, 1);
    assert_eq!(
        fs::metadata(tuesday.join("etc/hosts")).unwrap().ino(),
        fs::metadata(monday.join("etc/hosts")).unwrap().ino()
    );
    assert_eq!(fs::read(tuesday.join("etc/motd")).unwrap(), b"goodbye\n");
}

#[test]
fn test_pax_mtime_round_trips_through_link_decision() {
    let temp = TempDir::new().unwrap();
    let first_dest = temp.path().join("first");
    let second_dest = temp.path().join("second");
    let data = || {
        TarTestBuilder::new()
            .add_file_with_pax_mtime("f.txt", b"pax", 0o644, "1650000000.5")
            .build()
    };

    extract_archive(Cursor::new(data()), &ExtractConfig::new(&first_dest)).unwrap();
    assert_eq!(
        mtime_of(&first_dest.join("f.txt")),
        FileTime::from_unix_time(1_650_000_000, 500_000_000)
    );

    let config = ExtractConfig::new(&second_dest).with_base(&first_dest);
    let report = extract_archive(Cursor::new(data()), &config).unwrap();
    assert_eq!(report.files_linked, 1);
}

#[test]
fn test_truncated_archive_is_rejected() {
    let d = dirs();
    let mut data = TarTestBuilder::new()
        .add_file("big.bin", &[7u8; 4096])
        .build();
    data.truncate(1024);

    let err = extract_archive(Cursor::new(data), &ExtractConfig::new(&d.dest)).unwrap_err();
    assert!(matches!(err, ExtractionError::InvalidArchive(_)), "{err:?}");
}

#[test]
fn test_directory_over_existing_file_is_fatal() {
    let d = dirs();
    fs::create_dir(&d.dest).unwrap();
    fs::write(d.dest.join("a"), b"not a directory").unwrap();

    let err = extract_archive(Cursor::new(sample_archive()), &ExtractConfig::new(&d.dest))
        .unwrap_err();

    match &err {
        ExtractionError::CreateDirectory { path, source } => {
            assert_eq!(path, &d.dest.join("a"));
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_filesystem_error());
    assert_eq!(fs::read(d.dest.join("a")).unwrap(), b"not a directory");
}

/// Slows the writer down so the walker is far ahead of it.
struct SlowWriter;

impl ProgressCallback for SlowWriter {
    fn on_file_written(&mut self, _path: &Path, _bytes: u64) {
        thread::sleep(Duration::from_millis(20));
    }

    fn on_file_linked(&mut self, _path: &Path, _bytes: u64) {}

    fn on_complete(&mut self) {}
}

#[test]
fn test_archive_error_stops_pending_writes() {
    let d = dirs();
    let mut builder = TarTestBuilder::new();
    for i in 0..30 {
        builder = builder.add_file(&format!("f{i:02}.txt"), b"x");
    }
    let mut data = builder.build();
    // Swap the end-of-archive blocks for a corrupt header.
    data.truncate(data.len() - 1024);
    data.extend_from_slice(&[0xAB; 512]);

    let err = extract_archive_with_progress(
        Cursor::new(data),
        &ExtractConfig::new(&d.dest),
        Box::new(SlowWriter),
    )
    .unwrap_err();

    assert!(matches!(err, ExtractionError::InvalidArchive(_)), "{err:?}");
    let on_disk = fs::read_dir(&d.dest).unwrap().count();
    assert!(on_disk < 30, "{on_disk} files written after the walker failed");
}
