//! rmdupes - find duplicate files and remove the redundant copies.
//!
//! Files under a root are grouped by BLAKE3 content digest. Each group
//! keeps the file with the lexically greatest path; the others are shown as
//! a removal plan and, only after confirmation, deleted, trashed or moved
//! into a quarantine directory.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytesize::ByteSize;

use crate::actions::{confirm, RemovalAction, RemovalPlan, Remover, ABORT_MESSAGE};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::{ExitCode, UsageError};
use crate::output::{write_removal_summary, JsonOutput, OutputFormat, TextReport};
use crate::progress::Progress;
use crate::signal::ShutdownHandler;

/// Run one invocation.
///
/// The report and the confirmation prompt go to `out`; the answer is read
/// from `input`. `shutdown` is checked throughout the scan and before each
/// removal.
///
/// # Errors
///
/// Returns an error for usage problems (bad root, bad options or config),
/// an interrupted scan, or a failure to write the report. Per-file problems
/// are reported, not returned.
pub fn run_app<R: BufRead, W: Write>(
    cli: Cli,
    shutdown: &ShutdownHandler,
    input: &mut R,
    out: &mut W,
) -> Result<ExitCode> {
    let config = Config::for_cli(&cli)?;
    let json = config.output == OutputFormat::Json;
    if cli.remove && json && !cli.yes {
        return Err(UsageError::InvalidOption(
            "--remove with --output json requires --yes".to_string(),
        )
        .into());
    }

    let root = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let progress = Arc::new(Progress::new(cli.quiet || json));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(config.io_threads)
            .with_verify(config.verify)
            .with_walker_config(config.walker_config())
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(progress),
    );

    let (groups, summary) = finder.find_duplicates(&root)?;
    let plan = RemovalPlan::from_groups(&groups);

    if !json {
        TextReport::new(&groups, &plan, &summary)
            .with_color(!cli.no_color)
            .write_to(out)
            .context("Failed to write report")?;
    }

    if !cli.remove || plan.is_empty() {
        if json {
            JsonOutput::new(&groups, &plan, &summary, ExitCode::Success).write_to(out, true)?;
        } else if cli.remove {
            writeln!(out, "Nothing to remove.")?;
        }
        return Ok(ExitCode::Success);
    }

    let action = config.removal_action(&summary.root)?;
    if !cli.yes {
        let prompt = removal_prompt(&action, &plan);
        if !confirm(&prompt, input, out).context("Failed to read confirmation")? {
            writeln!(out, "{ABORT_MESSAGE}")?;
            log::info!("Removal declined");
            return Ok(ExitCode::Success);
        }
    }

    let remover = Remover::new(action).with_shutdown_flag(shutdown.get_flag());
    let report = if json {
        remover.execute(&plan, &mut io::sink())?
    } else {
        remover.execute(&plan, out)?
    };
    let code = if report.interrupted {
        ExitCode::Interrupted
    } else {
        ExitCode::Success
    };

    if json {
        JsonOutput::new(&groups, &plan, &summary, code)
            .with_removal(remover.action(), &report)
            .write_to(out, true)?;
    } else {
        write_removal_summary(out, remover.action(), &report)?;
    }
    Ok(code)
}

fn removal_prompt(action: &RemovalAction, plan: &RemovalPlan) -> String {
    let amount = format!(
        "{} file(s) ({})",
        plan.file_count(),
        ByteSize::b(plan.total_bytes())
    );
    match action {
        RemovalAction::Delete => format!("Delete {amount}?"),
        RemovalAction::Trash => format!("Move {amount} to trash?"),
        RemovalAction::Quarantine { dir, .. } => {
            format!("Move {amount} to {}?", dir.display())
        }
    }
}
