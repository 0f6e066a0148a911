use super::helpers::write;
use rmdupes::duplicates::{DuplicateFinder, FinderConfig};
use rmdupes::scanner::WalkerConfig;
use std::path::PathBuf;
use tempfile::tempdir;

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_two_identical_one_different() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0].paths()), vec!["b.txt", "a.txt"]);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_three_identical_keeps_greatest() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x", b"same");
    write(dir.path(), "y", b"same");
    write(dir.path(), "z", b"same");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.retained().unwrap().path.file_name().unwrap(), "z");
    let removable: Vec<_> = group.removable().iter().map(|f| f.path.clone()).collect();
    assert_eq!(names(&removable), vec!["y", "x"]);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"nested dup");
    write(dir.path(), "a/b/c/deep.txt", b"nested dup");
    write(dir.path(), "a/other.txt", b"different");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(groups.len(), 1);
    // "top.txt" > "a/b/c/deep.txt" under the same root
    assert_eq!(names(&groups[0].paths()), vec!["top.txt", "deep.txt"]);
}

#[test]
fn test_scan_paths_are_under_canonical_root() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"1");
    write(dir.path(), "b", b"1");
    let root = dir.path().canonicalize().unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.root, root);
    assert!(groups[0].files.iter().all(|f| f.path.starts_with(&root)));
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for (name, content) in [("a", "1"), ("b", "1"), ("c", "2"), ("d", "2"), ("e", "3")] {
        write(dir.path(), &format!("sub/{name}"), content.as_bytes());
        write(dir.path(), name, content.as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 3);
    let paths = |groups: &[rmdupes::duplicates::DuplicateGroup]| {
        groups.iter().map(|g| g.paths()).collect::<Vec<_>>()
    };
    assert_eq!(paths(&first), paths(&second));
}

#[test]
fn test_scan_groups_are_disjoint() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{i:02}"), format!("{}", i % 4).as_bytes());
    }

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 4);
    let mut all: Vec<_> = groups.iter().flat_map(|g| g.paths()).collect();
    let before = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), before);
    assert_eq!(before, 20);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"dup");
    write(dir.path(), ".hidden.txt", b"dup");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_skip_hidden(true));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_scan_with_verify_and_single_thread() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"verified");
    write(dir.path(), "b", b"verified");

    let config = FinderConfig::default().with_io_threads(1).with_verify(true);
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(summary.verified);
}
