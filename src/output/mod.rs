//! Output formatters for duplicate scan results.
//!
//! This module provides the two report formats:
//! - Text for people reviewing groups before removal
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::actions::RemovalPlan;
//! use rmdupes::duplicates::DuplicateFinder;
//! use rmdupes::output::TextReport;
//! use std::path::Path;
//!
//! let (groups, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let plan = RemovalPlan::from_groups(&groups);
//! print!("{}", TextReport::new(&groups, &plan, &summary).render());
//! ```

pub mod json;
pub mod text;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use json::{JsonOutput, JsonOutputError};
pub use text::{write_removal_summary, TextReport};

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Text,
    /// Machine-readable JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
