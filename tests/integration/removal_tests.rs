use super::helpers::{run, tree, write};
use rmdupes::actions::ABORT_MESSAGE;
use rmdupes::duplicates::DuplicateFinder;
use rmdupes::error::ExitCode;
use std::fs;
use tempfile::tempdir;

fn dup_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "x", b"same");
    write(dir.path(), "y", b"same");
    write(dir.path(), "z", b"same");
    write(dir.path(), "other", b"different");
    dir
}

#[test]
fn test_declined_confirmation_leaves_tree_unchanged() {
    let dir = dup_tree();
    let before = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    let run = run(&[dir.path().to_str().unwrap(), "--remove"], "n\n");

    assert_eq!(run.code(), ExitCode::Success);
    assert!(run.output.contains("Delete 2 file(s) (8 B)? [y/N] "));
    assert!(run.output.ends_with(&format!("{ABORT_MESSAGE}\n")));
    assert!(!run.output.contains("Deleting"));
    assert_eq!(tree(dir.path()), vec!["other", "x", "y", "z"]);

    let after = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let paths = |g: &[rmdupes::duplicates::DuplicateGroup]| {
        g.iter().map(|g| g.paths()).collect::<Vec<_>>()
    };
    assert_eq!(paths(&before), paths(&after));
}

#[test]
fn test_end_of_input_declines() {
    let dir = dup_tree();

    let run = run(&[dir.path().to_str().unwrap(), "--remove"], "");

    assert!(run.output.contains(ABORT_MESSAGE));
    assert_eq!(tree(dir.path()).len(), 4);
}

#[test]
fn test_confirmed_delete_keeps_greatest_path() {
    let dir = dup_tree();
    let root = dir.path().canonicalize().unwrap();

    let run = run(&[dir.path().to_str().unwrap(), "--remove"], "y\n");

    assert_eq!(run.code(), ExitCode::Success);
    let deleting = format!(
        "Deleting {}...\nDeleting {}...\n",
        root.join("y").display(),
        root.join("x").display()
    );
    assert!(run.output.contains(&deleting), "got:\n{}", run.output);
    assert!(run.output.contains("Done.\nRemoved 2 file(s), freed 8 B"));
    assert_eq!(tree(dir.path()), vec!["other", "z"]);
}

#[test]
fn test_yes_skips_prompt() {
    let dir = dup_tree();

    let run = run(&[dir.path().to_str().unwrap(), "--remove", "--yes"], "");

    assert!(!run.output.contains("[y/N]"));
    assert_eq!(tree(dir.path()), vec!["other", "z"]);
}

#[test]
fn test_nothing_to_remove() {
    let dir = tempdir().unwrap();
    write(dir.path(), "only", b"one");

    let run = run(&[dir.path().to_str().unwrap(), "--remove"], "y\n");

    assert_eq!(run.code(), ExitCode::Success);
    assert!(run.output.contains("Nothing to remove."));
    assert!(!run.output.contains("[y/N]"));
}

#[test]
fn test_quarantine_preserves_layout() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("scan");
    write(&scan, "photos/2020/a.jpg", b"jpeg");
    write(&scan, "photos/2021/a.jpg", b"jpeg");
    let quarantine = dir.path().join("quarantine");

    let run = run(
        &[
            scan.to_str().unwrap(),
            "--remove",
            "--quarantine-dir",
            quarantine.to_str().unwrap(),
        ],
        "yes\n",
    );

    assert_eq!(run.code(), ExitCode::Success, "got:\n{}", run.output);
    assert!(run.output.contains("Quarantining "));
    assert!(run.output.contains("Quarantined files are in "));
    assert_eq!(tree(&scan), vec!["photos/2021/a.jpg"]);
    assert_eq!(tree(&quarantine), vec!["photos/2020/a.jpg"]);
    assert_eq!(
        fs::read(quarantine.join("photos/2020/a.jpg")).unwrap(),
        b"jpeg"
    );
}

#[test]
fn test_quarantine_inside_root_is_not_scanned() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");
    let quarantine = dir.path().join("q");
    write(&quarantine, "a", b"dup");

    let run = run(
        &[
            dir.path().to_str().unwrap(),
            "--remove",
            "--yes",
            "--quarantine-dir",
            quarantine.to_str().unwrap(),
        ],
        "",
    );

    assert_eq!(run.code(), ExitCode::Success, "got:\n{}", run.output);
    assert!(run.output.contains("Group 1 of 1 (2 files"));
    // Existing q/a forces the collision suffix
    assert_eq!(tree(dir.path()), vec!["b", "q/a", "q/a.1"]);
}

#[test]
fn test_json_removal_report() {
    let dir = dup_tree();

    let run = run(
        &[
            dir.path().to_str().unwrap(),
            "--output",
            "json",
            "--remove",
            "--yes",
        ],
        "",
    );

    assert_eq!(run.code(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&run.output).unwrap();
    assert_eq!(value["removal"]["action"], "delete");
    assert_eq!(value["removal"]["reversible"], false);
    assert_eq!(value["removal"]["removed"].as_array().unwrap().len(), 2);
    assert_eq!(value["removal"]["bytes_freed"], 8);
    assert_eq!(value["removal"]["interrupted"], false);
    assert_eq!(tree(dir.path()), vec!["other", "z"]);
}
