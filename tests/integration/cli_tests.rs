use super::helpers::{run, run_argv, tree, write};
use clap::Parser;
use rmdupes::cli::Cli;
use rmdupes::error::ExitCode;
use tempfile::tempdir;

#[test]
fn test_report_two_identical_one_different() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");
    let root = dir.path().canonicalize().unwrap();

    let run = run(&[dir.path().to_str().unwrap()], "");

    assert_eq!(run.code(), ExitCode::Success);
    let expected = format!(
        "Group 1 of 1 (2 files, 5 B each):\n  {b}\n  {a}\nKeeping: {b}\n\
         The following will be removed:\n  {a}\n",
        a = root.join("a.txt").display(),
        b = root.join("b.txt").display(),
    );
    assert!(run.output.starts_with(&expected), "got:\n{}", run.output);
    assert!(!run.output.contains("c.txt"));
    assert!(run.output.contains("1 duplicate group(s), 1 redundant file(s)"));
    // Report only: nothing removed, no prompt
    assert!(!run.output.contains("[y/N]"));
    assert_eq!(tree(dir.path()), vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn test_report_empty_directory() {
    let dir = tempdir().unwrap();

    let run = run(&[dir.path().to_str().unwrap()], "");

    assert_eq!(run.code(), ExitCode::Success);
    assert!(run.output.starts_with("No duplicates found\n"));
    assert!(run.output.contains("0 duplicate group(s)"));
}

#[test]
fn test_report_three_identical() {
    let dir = tempdir().unwrap();
    for name in ["x", "y", "z"] {
        write(dir.path(), name, b"same");
    }
    let root = dir.path().canonicalize().unwrap();

    let run = run(&[dir.path().to_str().unwrap()], "");

    let keep = format!("Keeping: {}\n", root.join("z").display());
    let removed = format!(
        "The following will be removed:\n  {}\n  {}\n",
        root.join("y").display(),
        root.join("x").display()
    );
    assert!(run.output.contains(&keep));
    assert!(run.output.contains(&removed));
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");
    let root = dir.path().canonicalize().unwrap();

    let run = run(&[dir.path().to_str().unwrap(), "--output", "json"], "");

    assert_eq!(run.code(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&run.output).unwrap();
    assert_eq!(value["root"], root.to_str().unwrap());
    assert_eq!(value["groups"].as_array().unwrap().len(), 1);
    assert_eq!(value["groups"][0]["keep"], root.join("b").to_str().unwrap());
    assert_eq!(value["groups"][0]["remove"][0], root.join("a").to_str().unwrap());
    assert_eq!(value["summary"]["duplicate_groups"], 1);
    assert_eq!(value["summary"]["exit_code"], 0);
    assert!(value["removal"].is_null());
}

#[test]
fn test_missing_root_is_usage_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let run = run(&[missing.to_str().unwrap()], "");

    assert!(run.result.is_err());
    assert_eq!(run.code(), ExitCode::UsageError);
    assert!(run.output.is_empty());
}

#[test]
fn test_file_root_is_usage_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file.txt", b"x");

    let run = run(&[dir.path().join("file.txt").to_str().unwrap()], "");

    assert_eq!(run.code(), ExitCode::UsageError);
}

#[test]
fn test_second_positional_is_rejected() {
    let err = Cli::try_parse_from(["rmdupes", "/a", "/b"]).unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::UsageError.as_i32());
}

#[test]
fn test_json_remove_requires_yes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");

    let run = run(
        &[dir.path().to_str().unwrap(), "--output", "json", "--remove"],
        "y\n",
    );

    assert_eq!(run.code(), ExitCode::UsageError);
    let message = format!("{:#}", run.result.unwrap_err());
    assert!(message.contains("--yes"));
    assert_eq!(tree(dir.path()), vec!["a", "b"]);
}

#[test]
fn test_quarantine_action_without_dir_is_usage_error() {
    let dir = tempdir().unwrap();

    let run = run(&[dir.path().to_str().unwrap(), "--action", "quarantine"], "");

    assert_eq!(run.code(), ExitCode::UsageError);
}

#[test]
fn test_zero_io_threads_is_usage_error() {
    let dir = tempdir().unwrap();

    let run = run(&[dir.path().to_str().unwrap(), "--io-threads", "0"], "");

    assert_eq!(run.code(), ExitCode::UsageError);
}

#[test]
fn test_missing_config_file_is_usage_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nope.toml");

    let run = run_argv(
        &[
            "rmdupes",
            "--no-color",
            "--config",
            config.to_str().unwrap(),
            dir.path().to_str().unwrap(),
        ],
        "",
    );

    assert_eq!(run.code(), ExitCode::UsageError);
}
