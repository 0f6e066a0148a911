//! Command-line interface definitions for rmdupes.
//!
//! All options are flat: one optional root path plus flags. Options that
//! can also come from the configuration file are `Option`s here so that an
//! absent flag does not override a configured value.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under the current directory
//! rmdupes
//!
//! # Report as JSON for scripting
//! rmdupes ~/Downloads --output json
//!
//! # Move redundant copies into a quarantine directory after confirming
//! rmdupes ~/Photos --remove --quarantine-dir ~/dupes
//!
//! # Debug logging
//! rmdupes -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Find duplicate files and remove the redundant copies.
///
/// Files are grouped by BLAKE3 content digest. In each group the file with
/// the lexically greatest path is kept; the others are proposed for removal
/// and only removed after confirmation.
#[derive(Debug, Parser)]
#[command(name = "rmdupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report format
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Remove redundant copies after confirmation
    #[arg(long)]
    pub remove: bool,

    /// How redundant copies are removed
    #[arg(long, value_enum, value_name = "ACTION")]
    pub action: Option<ActionArg>,

    /// Move redundant copies into DIR (implies --action quarantine)
    #[arg(long, value_name = "DIR")]
    pub quarantine_dir: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Compare same-digest files byte for byte before grouping them
    #[arg(long)]
    pub verify: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Removal method selectable on the command line and in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionArg {
    /// Permanently delete redundant copies (default)
    #[default]
    Delete,
    /// Move redundant copies to the system trash
    Trash,
    /// Move redundant copies into the quarantine directory
    Quarantine,
}

impl std::fmt::Display for ActionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionArg::Delete => write!(f, "delete"),
            ActionArg::Trash => write!(f, "trash"),
            ActionArg::Quarantine => write!(f, "quarantine"),
        }
    }
}
