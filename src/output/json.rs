//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/photos",
//!   "groups": [
//!     {
//!       "index": 1,
//!       "digest": "abc123...",
//!       "size": 1024,
//!       "files": ["/photos/b.jpg", "/photos/a.jpg"],
//!       "keep": "/photos/b.jpg",
//!       "remove": ["/photos/a.jpg"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 1024,
//!     "exit_code_name": "RD000"
//!   },
//!   "removal": null
//! }
//! ```
//!
//! `removal` is filled in only when files were actually removed.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::{RemovalAction, RemovalPlan, RemovalReport};
use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// 1-based group number, matching the text report
    pub index: usize,
    /// BLAKE3 digest as hexadecimal string (64 characters)
    pub digest: String,
    /// Size of one copy in bytes
    pub size: u64,
    /// All members in retention order
    pub files: Vec<String>,
    /// Retained file
    pub keep: String,
    /// Files the removal would take away
    pub remove: Vec<String>,
}

/// A path that could not be scanned.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPathError {
    /// Affected path
    pub path: String,
    /// Error message
    pub message: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Files whose digest was computed
    pub hashed_files: usize,
    /// Files that could not be read
    pub unhashed_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies (excluding retained files)
    pub duplicate_files: usize,
    /// Bytes that removing every redundant copy frees
    pub reclaimable_space: u64,
    /// Whether groups were verified byte for byte
    pub verified: bool,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Paths skipped during the scan
    pub errors: Vec<JsonPathError>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "RD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            hashed_files: summary.hashed_files,
            unhashed_files: summary.unhashed_files,
            total_size: summary.total_size,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            verified: summary.verified,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            errors: summary
                .scan_errors
                .iter()
                .map(|e| JsonPathError {
                    path: path_string(e.path()),
                    message: e.to_string(),
                })
                .collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A removed file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemovedFile {
    /// Original path
    pub path: String,
    /// Quarantine location, if any
    pub destination: Option<String>,
}

/// Outcome of a removal run in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemoval {
    /// "delete", "trash" or "quarantine"
    pub action: String,
    /// Whether removed files can still be recovered (trash or quarantine)
    pub reversible: bool,
    /// Files removed
    pub removed: Vec<JsonRemovedFile>,
    /// Files (or groups) that were not removed
    pub failures: Vec<JsonPathError>,
    /// Bytes freed
    pub bytes_freed: u64,
    /// Whether a shutdown request cut the run short
    pub interrupted: bool,
}

impl JsonRemoval {
    /// Create from a removal report.
    #[must_use]
    pub fn from_report(action: &RemovalAction, report: &RemovalReport) -> Self {
        Self {
            action: action.name().to_string(),
            reversible: action.is_reversible(),
            removed: report
                .removed
                .iter()
                .map(|r| JsonRemovedFile {
                    path: path_string(&r.path),
                    destination: r.destination.as_deref().map(path_string),
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|e| JsonPathError {
                    path: path_string(e.path()),
                    message: e.to_string(),
                })
                .collect(),
            bytes_freed: report.bytes_freed,
            interrupted: report.interrupted,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Scan root
    pub root: String,
    /// List of duplicate groups
    pub groups: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Removal outcome, when a removal ran
    pub removal: Option<JsonRemoval>,
}

impl JsonOutput {
    /// Create JSON output from the groups, their removal plan and the summary.
    ///
    /// # Example
    ///
    /// ```
    /// use rmdupes::actions::RemovalPlan;
    /// use rmdupes::duplicates::{DuplicateGroup, ScanSummary};
    /// use rmdupes::error::ExitCode;
    /// use rmdupes::output::json::JsonOutput;
    /// use rmdupes::scanner::FileRecord;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new([0u8; 32], 1024, vec![
    ///     FileRecord::new(PathBuf::from("/file1.txt"), [0u8; 32], 1024),
    ///     FileRecord::new(PathBuf::from("/file2.txt"), [0u8; 32], 1024),
    /// ])];
    /// let plan = RemovalPlan::from_groups(&groups);
    ///
    /// let output = JsonOutput::new(&groups, &plan, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.groups[0].keep, "/file2.txt");
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        plan: &RemovalPlan,
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        let groups = groups
            .iter()
            .zip(&plan.entries)
            .map(|(group, entry)| JsonDuplicateGroup {
                index: entry.group_index,
                digest: group.hash_hex(),
                size: group.size,
                files: group.files.iter().map(|f| path_string(&f.path)).collect(),
                keep: path_string(&entry.keep.path),
                remove: entry.remove.iter().map(|f| path_string(&f.path)).collect(),
            })
            .collect();

        Self {
            root: path_string(&summary.root),
            groups,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            removal: None,
        }
    }

    /// Attach the outcome of a removal run.
    #[must_use]
    pub fn with_removal(mut self, action: &RemovalAction, report: &RemovalReport) -> Self {
        self.removal = Some(JsonRemoval::from_report(action, report));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
