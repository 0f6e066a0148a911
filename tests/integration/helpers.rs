//! Shared fixtures: scratch trees and in-process runs of the binary logic.

use clap::Parser;
use rmdupes::cli::Cli;
use rmdupes::error::ExitCode;
use rmdupes::signal::ShutdownHandler;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Outcome of one in-process run.
pub struct Run {
    pub result: anyhow::Result<ExitCode>,
    pub output: String,
}

impl Run {
    pub fn code(&self) -> ExitCode {
        match &self.result {
            Ok(code) => *code,
            Err(err) => ExitCode::from_error(err),
        }
    }
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Run with an empty config file so the user's own config never leaks in.
pub fn run(args: &[&str], answer: &str) -> Run {
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("config.toml");
    fs::write(&config, "").unwrap();
    let config = config.to_str().unwrap().to_string();

    let mut argv = vec!["rmdupes", "--no-color", "-q", "--config", config.as_str()];
    argv.extend_from_slice(args);
    run_argv(&argv, answer)
}

/// Run with exactly `argv`.
pub fn run_argv(argv: &[&str], answer: &str) -> Run {
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut input = answer.as_bytes();
    let mut out = Vec::new();
    let result = rmdupes::run_app(cli, &ShutdownHandler::new(), &mut input, &mut out);
    Run {
        result,
        output: String::from_utf8(out).unwrap(),
    }
}

/// Paths of every regular file under `root`, relative and sorted.
pub fn tree(root: &Path) -> Vec<String> {
    fn visit(base: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                visit(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    visit(root, root, &mut out);
    out.sort();
    out
}
