//! End-to-end scan pipeline tests against real directory trees.

use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::ScanOptions;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn write_file(dir: &std::path::Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (result, summary) = finder.scan(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.duplicate_group_count, 0);
    assert_eq!(result.wasted_bytes, 0);
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"content a");
    write_file(dir.path(), "b.txt", b"content b");
    write_file(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder.scan(dir.path()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(result.groups.len(), 3);
    assert_eq!(result.duplicate_group_count, 0);
    assert_eq!(result.wasted_bytes, 0);
}

#[test]
fn test_scenario_a_one_duplicate_pair() {
    // a.txt and b.txt share content "X"; c.txt differs
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"X");
    write_file(dir.path(), "b.txt", b"X");
    write_file(dir.path(), "c.txt", b"Y");

    let finder = DuplicateFinder::with_defaults();
    let (result, _) = finder.scan(dir.path()).unwrap();

    assert_eq!(result.duplicate_group_count, 1);
    assert_eq!(result.duplicated_file_count, 2);
    assert_eq!(result.wasted_bytes, 1);

    let group = result.duplicate_groups().next().unwrap();
    let names: Vec<_> = group
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert!(!names.contains(&"c.txt".to_string()));
}

#[test]
fn test_scenario_b_empty_files_included() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let finder = DuplicateFinder::with_defaults();
    let (result, _) = finder.scan(dir.path()).unwrap();

    assert_eq!(result.duplicate_group_count, 1);
    assert_eq!(result.duplicated_file_count, 2);
    assert_eq!(result.wasted_bytes, 0);
}

#[test]
fn test_scenario_b_empty_files_excluded() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let options = ScanOptions {
        include_empty_files: false,
        ..Default::default()
    };
    let config = FinderConfig::default().with_scan_options(options);
    let finder = DuplicateFinder::new(config);
    let (result, summary) = finder.scan(dir.path()).unwrap();

    assert_eq!(summary.total_files, 0);
    assert_eq!(result.duplicate_group_count, 0);
}

#[test]
#[cfg(unix)]
fn test_scenario_c_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"same");
    write_file(dir.path(), "b.txt", b"same");
    write_file(dir.path(), "locked.txt", b"hidden");

    let locked = dir.path().join("locked.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder.scan(dir.path()).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    // Scan completes either way; when the open failed (non-root), the
    // file is absent from every group and the skip count reflects it.
    assert_eq!(result.duplicate_group_count, 1);
    if summary.skipped_files > 0 {
        assert_eq!(summary.skipped_files, 1);
        assert!(result
            .groups
            .iter()
            .all(|g| g.files.iter().all(|f| f.path != locked)));
    }
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "top.txt", b"dup");
    write_file(dir.path(), "sub/nested.txt", b"dup");
    write_file(dir.path(), "sub/deeper/leaf.txt", b"dup");

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder.scan(dir.path()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(result.duplicate_group_count, 1);
    assert_eq!(result.duplicated_file_count, 3);
    assert_eq!(result.wasted_bytes, 6);
}

#[test]
fn test_scan_multiple_groups() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "1a.txt", b"group1");
    write_file(dir.path(), "1b.txt", b"group1");
    write_file(dir.path(), "1c.txt", b"group1");
    write_file(dir.path(), "2a.txt", b"group2!");
    write_file(dir.path(), "2b.txt", b"group2!");
    write_file(dir.path(), "solo.txt", b"solo");

    let finder = DuplicateFinder::with_defaults();
    let (result, _) = finder.scan(dir.path()).unwrap();

    assert_eq!(result.duplicate_group_count, 2);
    assert_eq!(result.duplicated_file_count, 5);
    // group1: 6 bytes x 2 extra copies, group2!: 7 bytes x 1 extra copy
    assert_eq!(result.wasted_bytes, 6 * 2 + 7);
}

#[test]
fn test_completeness_every_file_recorded_once() {
    let dir = tempdir().unwrap();
    for i in 0..25 {
        write_file(
            dir.path(),
            &format!("f{:02}.dat", i),
            format!("payload-{}", i % 7).as_bytes(),
        );
    }

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder.scan(dir.path()).unwrap();

    let recorded: usize = result.groups.iter().map(|g| g.len()).sum();
    assert_eq!(recorded, 25);
    assert_eq!(summary.total_files, 25);
    assert_eq!(summary.hashed_files, 25);
    assert_eq!(summary.skipped_files, 0);
}

#[test]
fn test_idempotence_across_runs_and_concurrency() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        write_file(
            dir.path(),
            &format!("d{}/f{:02}.bin", i % 4, i),
            format!("blob-{}", i % 6).as_bytes(),
        );
    }

    let snapshot = |workers: usize| {
        let config = FinderConfig::default().with_max_concurrency(workers);
        let (result, _) = DuplicateFinder::new(config).scan(dir.path()).unwrap();
        result
            .groups
            .iter()
            .map(|g| (g.digest, g.paths()))
            .collect::<Vec<_>>()
    };

    let first = snapshot(1);
    assert_eq!(first, snapshot(1));
    assert_eq!(first, snapshot(8));
}

#[test]
fn test_grouping_correctness() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "same1.txt", b"identical bytes");
    write_file(dir.path(), "same2.txt", b"identical bytes");
    write_file(dir.path(), "diff.txt", b"different bytes");

    let finder = DuplicateFinder::with_defaults();
    let (result, _) = finder.scan(dir.path()).unwrap();

    let digest_of = |name: &str| {
        result
            .groups
            .iter()
            .find(|g| g.files.iter().any(|f| f.path.file_name().unwrap() == name))
            .map(|g| g.digest)
            .unwrap()
    };

    assert_eq!(digest_of("same1.txt"), digest_of("same2.txt"));
    assert_ne!(digest_of("same1.txt"), digest_of("diff.txt"));
}

#[test]
fn test_invalid_root_is_fatal() {
    let finder = DuplicateFinder::with_defaults();
    assert!(finder.scan(std::path::Path::new("/no/such/root")).is_err());

    let dir = tempdir().unwrap();
    write_file(dir.path(), "file.txt", b"x");
    assert!(finder.scan(&dir.path().join("file.txt")).is_err());
}

#[test]
fn test_ignore_patterns_exclude_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "keep1.txt", b"dup");
    write_file(dir.path(), "keep2.txt", b"dup");
    write_file(dir.path(), "noise.tmp", b"dup");

    let options = ScanOptions {
        ignore_patterns: vec!["*.tmp".to_string()],
        ..Default::default()
    };
    let config = FinderConfig::default().with_scan_options(options);
    let (result, summary) = DuplicateFinder::new(config).scan(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    let group = result.duplicate_groups().next().unwrap();
    assert_eq!(group.len(), 2);
}
