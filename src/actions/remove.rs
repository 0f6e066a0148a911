//! Removal of redundant copies.
//!
//! # Overview
//!
//! A [`RemovalPlan`] lists, per duplicate group, the retained file and the
//! files to remove. The plan is built once from the groups and used both
//! for the preview and by [`Remover::execute`], so what is shown is what
//! gets removed.
//!
//! Three actions are supported:
//! - [`RemovalAction::Delete`]: permanent `remove_file`
//! - [`RemovalAction::Trash`]: move to the system trash (recoverable)
//! - [`RemovalAction::Quarantine`]: move under a quarantine directory,
//!   keeping the path relative to the scan root
//!
//! # Safety
//!
//! Before touching a file the remover checks that the group's retained
//! copy still exists and that the file still has its scanned size. A
//! failed check skips the file (or group); nothing aborts the batch.
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::actions::{RemovalAction, RemovalPlan, Remover};
//! use rmdupes::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (groups, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("/photos"))
//!     .unwrap();
//! let plan = RemovalPlan::from_groups(&groups);
//! let report = Remover::new(RemovalAction::Trash)
//!     .execute(&plan, &mut std::io::stdout())
//!     .unwrap();
//! println!("{}", report.summary());
//! ```

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// What happens to a file selected for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalAction {
    /// Permanently delete the file.
    Delete,
    /// Move the file to the system trash.
    Trash,
    /// Move the file under `dir`, keeping its path relative to `root`.
    Quarantine {
        /// Quarantine directory
        dir: PathBuf,
        /// Scan root the relative paths are taken from
        root: PathBuf,
    },
}

impl RemovalAction {
    /// Short name used in logs and JSON output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Trash => "trash",
            Self::Quarantine { .. } => "quarantine",
        }
    }

    /// Whether the removed file can be recovered afterwards.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Delete)
    }
}

/// Error type for removal of a single file.
#[derive(Debug, Error)]
pub enum RemovalError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to remove.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {path} (size {expected} -> {actual})")]
    Modified {
        /// File that changed
        path: PathBuf,
        /// Size recorded by the scan
        expected: u64,
        /// Size found now
        actual: u64,
    },

    /// The group's retained copy is gone, so its other members are kept.
    #[error("retained copy {path} no longer exists; group skipped")]
    RetainedMissing {
        /// Retained file that vanished
        path: PathBuf,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that could not be trashed
        path: PathBuf,
        /// Error reported by the trash backend
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl RemovalError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified { path: p, .. }
            | Self::RetainedMissing { path: p }
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// The removal proposed for one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRemoval {
    /// 1-based position of the group in the report
    pub group_index: usize,
    /// File that stays
    pub keep: FileRecord,
    /// Files to remove, in retention order
    pub remove: Vec<FileRecord>,
}

/// Removal proposal for a whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    /// One entry per duplicate group
    pub entries: Vec<PlannedRemoval>,
}

impl RemovalPlan {
    /// Build the plan from groups stored in retention order.
    #[must_use]
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let entries = groups
            .iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let keep = group.retained()?.clone();
                Some(PlannedRemoval {
                    group_index: i + 1,
                    keep,
                    remove: group.removable().to_vec(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Number of files the plan would remove.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|e| e.remove.len()).sum()
    }

    /// Bytes the plan would free.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|e| &e.remove)
            .map(|f| f.size)
            .sum()
    }

    /// Whether there is nothing to remove.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}

/// A file that was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFile {
    /// Original location
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// New location for quarantined files
    pub destination: Option<PathBuf>,
}

/// Outcome of executing a plan.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Files removed
    pub removed: Vec<RemovedFile>,
    /// Per-file (or per-group) failures
    pub failures: Vec<RemovalError>,
    /// Total bytes freed
    pub bytes_freed: u64,
    /// Whether a shutdown request stopped the run early
    pub interrupted: bool,
}

impl RemovalReport {
    /// Number of files removed.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.removed.len()
    }

    /// Number of failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every planned removal succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Removed {} file(s), freed {}",
            self.success_count(),
            ByteSize::b(self.bytes_freed)
        );
        if !self.failures.is_empty() {
            text.push_str(&format!(", {} failed", self.failure_count()));
        }
        if self.interrupted {
            text.push_str(" (interrupted)");
        }
        text
    }
}

/// Executes a [`RemovalPlan`].
#[derive(Debug, Clone)]
pub struct Remover {
    action: RemovalAction,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Remover {
    /// Create a remover for `action`.
    #[must_use]
    pub fn new(action: RemovalAction) -> Self {
        Self {
            action,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag checked before each file.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The configured action.
    #[must_use]
    pub fn action(&self) -> &RemovalAction {
        &self.action
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Remove every file the plan lists, announcing each one on `out`.
    ///
    /// A failure is recorded and the next file is tried. A shutdown request
    /// leaves all remaining files untouched.
    ///
    /// # Errors
    ///
    /// Only a failure to write to `out` is returned as an error.
    pub fn execute<W: Write>(&self, plan: &RemovalPlan, out: &mut W) -> io::Result<RemovalReport> {
        let mut report = RemovalReport::default();
        log::info!(
            "Removing {} file(s) with action '{}'",
            plan.file_count(),
            self.action.name()
        );

        'groups: for entry in &plan.entries {
            if fs::symlink_metadata(&entry.keep.path).is_err() {
                log::warn!(
                    "Retained file {} is missing, skipping group {}",
                    entry.keep.path.display(),
                    entry.group_index
                );
                report.failures.push(RemovalError::RetainedMissing {
                    path: entry.keep.path.clone(),
                });
                continue;
            }

            for file in &entry.remove {
                if self.is_shutdown_requested() {
                    log::info!("Shutdown requested, leaving remaining files in place");
                    report.interrupted = true;
                    break 'groups;
                }
                debug_assert_ne!(file.path, entry.keep.path);

                match self.remove_one(file, out)? {
                    Ok(removed) => {
                        report.bytes_freed += removed.size;
                        report.removed.push(removed);
                    }
                    Err(e) => {
                        log::warn!("Failed to remove {}: {}", file.path.display(), e);
                        writeln!(out, "Failed: {e}")?;
                        report.failures.push(e);
                    }
                }
            }
        }

        log::info!("{}", report.summary());
        Ok(report)
    }

    /// Outer result: output sink failure. Inner result: removal outcome.
    fn remove_one<W: Write>(
        &self,
        file: &FileRecord,
        out: &mut W,
    ) -> io::Result<Result<RemovedFile, RemovalError>> {
        if let Err(e) = check_unchanged(file) {
            return Ok(Err(e));
        }
        let path = &file.path;

        let outcome = match &self.action {
            RemovalAction::Delete => {
                writeln!(out, "Deleting {}...", path.display())?;
                fs::remove_file(path)
                    .map(|()| None)
                    .map_err(|e| RemovalError::from_io(path, e))
            }
            RemovalAction::Trash => {
                writeln!(out, "Moving {} to trash...", path.display())?;
                trash::delete(path)
                    .map(|()| None)
                    .map_err(|e| RemovalError::TrashFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })
            }
            RemovalAction::Quarantine { dir, root } => {
                let dest = quarantine_destination(dir, root, path);
                writeln!(out, "Quarantining {} -> {}...", path.display(), dest.display())?;
                move_file(path, &dest).map(|()| Some(dest))
            }
        };

        Ok(outcome.map(|destination| {
            log::debug!("Removed {} ({} bytes)", path.display(), file.size);
            RemovedFile {
                path: path.clone(),
                size: file.size,
                destination,
            }
        }))
    }
}

/// Check that `file` still exists with the size recorded by the scan.
///
/// # Errors
///
/// `NotFound`, `PermissionDenied` or `Io` if the file cannot be inspected,
/// `Modified` if its size changed.
pub fn check_unchanged(file: &FileRecord) -> Result<(), RemovalError> {
    let metadata = fs::metadata(&file.path).map_err(|e| RemovalError::from_io(&file.path, e))?;
    if metadata.len() != file.size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            file.path.display(),
            file.size,
            metadata.len()
        );
        return Err(RemovalError::Modified {
            path: file.path.clone(),
            expected: file.size,
            actual: metadata.len(),
        });
    }
    Ok(())
}

/// Where `path` lands inside the quarantine directory.
///
/// The path relative to `root` is kept. If that name is taken, `.1`, `.2`,
/// ... is appended to the file name until a free one is found. Paths
/// outside `root` keep only their file name.
#[must_use]
pub fn quarantine_destination(dir: &Path, root: &Path, path: &Path) -> PathBuf {
    let relative = match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
    };
    let candidate = dir.join(relative);
    if fs::symlink_metadata(&candidate).is_err() {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let mut name = OsString::from(candidate.as_os_str());
        name.push(format!(".{n}"));
        let numbered = PathBuf::from(name);
        if fs::symlink_metadata(&numbered).is_err() {
            return numbered;
        }
        n += 1;
    }
}

/// Move `source` to `dest`, copying across filesystems when rename fails.
fn move_file(source: &Path, dest: &Path) -> Result<(), RemovalError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| RemovalError::from_io(parent, e))?;
    }

    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    log::debug!(
        "Rename failed for {}, falling back to copy",
        source.display()
    );
    fs::copy(source, dest).map_err(|e| RemovalError::from_io(source, e))?;
    if let Err(e) = fs::remove_file(source) {
        // Never leave two copies behind
        let _ = fs::remove_file(dest);
        return Err(RemovalError::from_io(source, e));
    }
    Ok(())
}
