//! Scan pipeline: walk, hash, group, optionally verify.
//!
//! # Overview
//!
//! [`DuplicateFinder`] drives one pass over a directory tree:
//! 1. **Walk** - collect every regular file under the root
//! 2. **Hash** - full-content BLAKE3 digest per file on a bounded pool
//! 3. **Group** - partition by digest (see [`crate::duplicates::groups`])
//! 4. **Verify** - optional byte comparison inside each group
//!
//! Files that cannot be listed or read are recorded as errors in the
//! [`ScanSummary`] and never stop the scan. Only a bad root or a shutdown
//! request ends it early.
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_duplicates(Path::new("/photos")).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_digest, verify_group, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    Digest, FileRecord, HashError, Hasher, ScanError, ScanResult, WalkedFile, Walker, WalkerConfig,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Byte-compare members of each digest group before reporting it.
    pub verify: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("verify", &self.verify)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            verify: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-by-byte verification of digest groups.
    #[must_use]
    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Total number of regular files found
    pub total_files: usize,
    /// Files whose digest was computed
    pub hashed_files: usize,
    /// Files that could not be read
    pub unhashed_files: usize,
    /// Total size of all files found, in bytes
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies (group members beyond the retained one)
    pub duplicate_files: usize,
    /// Bytes freed by removing every redundant copy
    pub reclaimable_space: u64,
    /// Whether groups were byte-verified
    pub verified: bool,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Recoverable errors met during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that end a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be resolved.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Duplicate finder running the scan pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Walk and hash every file under `path`.
    ///
    /// The returned set has one record per file; unreadable files carry no
    /// digest and their errors are listed in [`ScanResult::errors`].
    ///
    /// # Errors
    ///
    /// - `PathNotFound` / `NotADirectory` for a bad root
    /// - `Interrupted` if the shutdown flag was raised
    pub fn scan(&self, path: &Path) -> Result<ScanResult, FinderError> {
        let root = resolve_root(path)?;
        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut result = ScanResult::default();
        let files = self.walk(&root, &mut result.errors);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        log::info!(
            "Found {} files ({})",
            files.len(),
            ByteSize::b(total_bytes)
        );

        let mut interrupted = false;
        for (file, outcome) in self.hash_all(files) {
            match outcome {
                Ok(digest) => {
                    let mut record = FileRecord::new(file.path, digest, file.size);
                    record.is_symlink = file.is_symlink;
                    result.insert(record);
                }
                Err(HashError::Interrupted(_)) => interrupted = true,
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    let mut record = FileRecord::unhashed(file.path, file.size);
                    record.is_symlink = file.is_symlink;
                    result.insert(record);
                    result.errors.push(ScanError::Hash(e));
                }
            }
        }

        if interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        Ok(result)
    }

    /// Find all duplicate groups under `path`.
    ///
    /// Groups are numbered by the first appearance of a member when files
    /// are ordered by path, so an untouched tree gives the same groups in
    /// the same order on every run.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::scan`].
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let scan = self.scan(path)?;

        let mut summary = ScanSummary {
            root: resolve_root(path)?,
            total_files: scan.len(),
            unhashed_files: scan.unhashed_count(),
            total_size: scan.total_size(),
            verified: self.config.verify,
            ..Default::default()
        };
        summary.hashed_files = summary.total_files - summary.unhashed_files;

        let (mut groups, stats) = group_by_digest(scan.records.into_values());
        summary.scan_errors = scan.errors;
        log::info!(
            "Grouping: {} files in {} groups, {} unique",
            stats.duplicate_files,
            stats.duplicate_groups,
            stats.unique
        );

        if self.config.verify && !groups.is_empty() {
            let (verified, errors) = self.verify_all(groups);
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }
            groups = verified;
            summary.scan_errors.extend(errors.into_iter().map(ScanError::Hash));
        }

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} redundant files, {} of {} reclaimable ({:.1}%)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.total_size_display(),
            summary.wasted_percentage()
        );

        Ok((groups, summary))
    }

    fn walk(&self, root: &Path, errors: &mut Vec<ScanError>) -> Vec<WalkedFile> {
        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start("walking", 0);
            cb.on_message(&format!("Searching for duplicate files in {}...", root.display()));
        }

        let mut walker_config = self.config.walker_config.clone();
        walker_config.exclude_dirs = walker_config
            .exclude_dirs
            .iter()
            .map(|dir| canonical_or_self(dir))
            .collect();

        let mut walker = Walker::new(root, walker_config);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(file) => {
                    if let Some(cb) = callback {
                        cb.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => errors.push(e),
            }
        }

        if let Some(cb) = callback {
            cb.on_phase_end("walking");
        }
        files
    }

    fn hash_all(&self, files: Vec<WalkedFile>) -> Vec<(WalkedFile, Result<Digest, HashError>)> {
        if files.is_empty() {
            return Vec::new();
        }

        let callback = self.config.progress_callback.clone();
        if let Some(ref cb) = callback {
            cb.on_phase_start("hashing", files.len());
        }
        log::info!(
            "Hashing {} files on {} threads",
            files.len(),
            self.config.io_threads
        );

        let done = AtomicUsize::new(0);
        let hasher = &self.hasher;
        let config = &self.config;
        let results = run_in_pool(self.config.io_threads, || {
            files
                .into_par_iter()
                .map(|file| {
                    if config.is_shutdown_requested() {
                        let interrupted = HashError::Interrupted(file.path.clone());
                        return (file, Err(interrupted));
                    }
                    let outcome = hasher.full_hash(&file.path);
                    if let Some(ref cb) = callback {
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        cb.on_progress(n, file.path.to_string_lossy().as_ref());
                        cb.on_item_completed(file.size);
                    }
                    (file, outcome)
                })
                .collect()
        });

        if let Some(ref cb) = callback {
            cb.on_phase_end("hashing");
        }
        results
    }

    fn verify_all(&self, groups: Vec<DuplicateGroup>) -> (Vec<DuplicateGroup>, Vec<HashError>) {
        let callback = self.config.progress_callback.clone();
        if let Some(ref cb) = callback {
            cb.on_phase_start("verifying", groups.len());
        }
        log::info!("Verifying {} groups byte for byte", groups.len());

        let done = AtomicUsize::new(0);
        let config = &self.config;
        let outcomes: Vec<_> = run_in_pool(self.config.io_threads, || {
            groups
                .into_par_iter()
                .map(|group| {
                    if config.is_shutdown_requested() {
                        return (vec![group], Vec::new());
                    }
                    let label = group
                        .retained()
                        .map(|f| f.path.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let outcome = verify_group(group);
                    if let Some(ref cb) = callback {
                        cb.on_progress(done.fetch_add(1, Ordering::Relaxed) + 1, &label);
                    }
                    outcome
                })
                .collect()
        });

        if let Some(ref cb) = callback {
            cb.on_phase_end("verifying");
        }

        let mut verified = Vec::new();
        let mut errors = Vec::new();
        for (split, errs) in outcomes {
            verified.extend(split);
            errors.extend(errs);
        }
        (verified, errors)
    }
}

/// Run `op` on a pool of `threads` workers, or on the global pool if the
/// dedicated one cannot be built.
fn run_in_pool<T: Send>(threads: usize, op: impl FnOnce() -> T + Send) -> T {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool, using global pool with {} threads: {}",
                rayon::current_num_threads(),
                e
            );
            op()
        }
    }
}

/// Validate the scan root and make it absolute.
fn resolve_root(path: &Path) -> Result<PathBuf, FinderError> {
    let root = std::fs::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FinderError::PathNotFound(path.to_path_buf()),
        _ => FinderError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !root.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    Ok(root)
}

/// Canonical form of `dir`, or `dir` itself if it does not exist yet.
fn canonical_or_self(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}
