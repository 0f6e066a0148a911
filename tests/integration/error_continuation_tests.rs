use super::helpers::write;
#[cfg(unix)]
use super::helpers::{run, tree};
use rmdupes::duplicates::{group_by_digest, DuplicateFinder};
#[cfg(unix)]
use rmdupes::error::ExitCode;
use rmdupes::scanner::{FileRecord, ScanError};
use std::path::PathBuf;
use tempfile::tempdir;

/// Whether permission bits are enforced for this process (not root).
#[cfg(unix)]
fn permissions_enforced(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).is_err()
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unlistable_subdirectory_does_not_stop_scan() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");
    write(dir.path(), "locked/hidden.txt", b"dup");
    let locked = dir.path().join("locked");
    set_mode(&locked, 0o000);

    let enforced = permissions_enforced(&locked);
    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    set_mode(&locked, 0o755);

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    if enforced {
        assert_eq!(groups[0].len(), 2);
        assert!(summary
            .scan_errors
            .iter()
            .any(|e| matches!(e, ScanError::PermissionDenied(_))));
    } else {
        assert_eq!(groups[0].len(), 3);
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_not_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");
    write(dir.path(), "c.txt", b"dup");
    let locked = dir.path().join("c.txt");
    set_mode(&locked, 0o000);

    let enforced = std::fs::File::open(&locked).is_err();
    let run = run(&[dir.path().to_str().unwrap()], "");
    set_mode(&locked, 0o644);

    assert_eq!(run.code(), ExitCode::Success);
    if enforced {
        assert!(run.output.contains("Group 1 of 1 (2 files"));
        assert!(run.output.contains("Skipped 1 path(s):"));
        assert!(run.output.contains("1 unreadable"));
    } else {
        assert!(run.output.contains("Group 1 of 1 (3 files"));
    }
    assert_eq!(tree(dir.path()).len(), 3);
}

#[test]
fn test_unhashed_records_never_group() {
    let records = vec![
        FileRecord::unhashed(PathBuf::from("/a"), 10),
        FileRecord::unhashed(PathBuf::from("/b"), 10),
        FileRecord::new(PathBuf::from("/c"), [1; 32], 10),
    ];

    let (groups, stats) = group_by_digest(records);

    assert!(groups.is_empty());
    assert_eq!(stats.unhashed, 2);
    assert_eq!(stats.unique, 1);
}

#[test]
fn test_file_removed_between_scan_and_report_is_tolerated() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
    std::fs::remove_file(dir.path().join("a")).unwrap();
    let (after, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(after.is_empty());
}
