//! File actions module.
//!
//! This module provides functionality for:
//! - Building the removal plan from duplicate groups
//! - Removing files by deletion, trash or quarantine
//! - The y/N confirmation that gates every removal
//!
//! ```no_run
//! use rmdupes::actions::{confirm, ABORT_MESSAGE};
//!
//! let mut stdin = std::io::stdin().lock();
//! if !confirm("Delete files?", &mut stdin, &mut std::io::stdout()).unwrap() {
//!     println!("{ABORT_MESSAGE}");
//! }
//! ```

pub mod confirm;
pub mod remove;

pub use confirm::{confirm, ABORT_MESSAGE};
pub use remove::{
    check_unchanged, quarantine_destination, PlannedRemoval, RemovalAction, RemovalError,
    RemovalPlan, RemovalReport, RemovedFile, Remover,
};
