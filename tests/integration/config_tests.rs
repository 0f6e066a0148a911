use super::helpers::{run_argv, tree, write};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use rmdupes::cli::ActionArg;
use rmdupes::config::Config;
use rmdupes::error::ExitCode;
use rmdupes::output::OutputFormat;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_defaults_through_figment() {
    // No Env layer, so other tests' variables cannot interfere
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
io_threads = 2
verify = true
action = "quarantine"
quarantine_dir = "/var/dupes"
output = "json"
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 2);
    assert!(config.verify);
    assert!(!config.skip_hidden);
    assert_eq!(config.action, ActionArg::Quarantine);
    assert_eq!(config.quarantine_dir, Some(PathBuf::from("/var/dupes")));
    assert_eq!(config.output, OutputFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_file_drives_run() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("scan");
    write(&scan, "a", b"dup");
    write(&scan, "b", b"dup");
    let config = dir.path().join("rmdupes.toml");
    fs::write(&config, "verify = true\nio_threads = 1\n").unwrap();

    let run = run_argv(
        &[
            "rmdupes",
            "--no-color",
            "-q",
            "--config",
            config.to_str().unwrap(),
            scan.to_str().unwrap(),
        ],
        "",
    );

    assert_eq!(run.code(), ExitCode::Success);
    assert!(run.output.contains(", verified)"), "got:\n{}", run.output);
}

#[test]
fn test_config_quarantine_used_for_removal() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("scan");
    write(&scan, "a", b"dup");
    write(&scan, "b", b"dup");
    let quarantine = dir.path().join("q");
    let config = dir.path().join("rmdupes.toml");
    fs::write(
        &config,
        format!(
            "action = \"quarantine\"\nquarantine_dir = {:?}\n",
            quarantine.to_str().unwrap()
        ),
    )
    .unwrap();

    let run = run_argv(
        &[
            "rmdupes",
            "--no-color",
            "-q",
            "--config",
            config.to_str().unwrap(),
            "--remove",
            "--yes",
            scan.to_str().unwrap(),
        ],
        "",
    );

    assert_eq!(run.code(), ExitCode::Success, "got:\n{}", run.output);
    assert_eq!(tree(&scan), vec!["b"]);
    assert_eq!(tree(&quarantine), vec!["a"]);
}

#[test]
fn test_invalid_config_value_is_usage_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "io_threads = \"eight\"\n").unwrap();

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
    let message = format!("{:#}", run.result.unwrap_err());
    assert!(message.contains("io_threads"), "got: {message}");
}

#[test]
fn test_cli_flag_overrides_config_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");
    let config = dir.path().join("c.toml");
    fs::write(&config, "output = \"json\"\n").unwrap();

    let run = run_argv(
        &[
            "rmdupes",
            "--no-color",
            "--config",
            config.to_str().unwrap(),
            "--output",
            "text",
            dir.path().to_str().unwrap(),
        ],
        "",
    );

    assert!(run.output.starts_with("Group 1 of 1"), "got:\n{}", run.output);
}
