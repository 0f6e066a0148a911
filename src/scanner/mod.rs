//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk
//! - Full-content hashing with BLAKE3
//! - Symlink alias detection (a link and its target are one file)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming or memory-mapped)
//! - [`identity`]: `(device, inode)` tracking for symlink aliases
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod identity;
pub mod walker;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use hasher::{files_identical, hash_to_hex, hex_to_hash, Digest, Hasher};
pub use walker::{WalkedFile, Walker};

/// A file seen during the scan, with its content digest.
///
/// `digest` is `None` when the file could not be read; such records are
/// kept in the result set for reporting but never grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// BLAKE3 digest of the full content, if hashing succeeded
    pub digest: Option<Digest>,
    /// File size in bytes at scan time
    pub size: u64,
    /// Whether the path is a symbolic link to a regular file
    pub is_symlink: bool,
}

impl FileRecord {
    /// Create a record for a successfully hashed file.
    #[must_use]
    pub fn new(path: PathBuf, digest: Digest, size: u64) -> Self {
        Self {
            path,
            digest: Some(digest),
            size,
            is_symlink: false,
        }
    }

    /// Create a record for a file whose content could not be hashed.
    #[must_use]
    pub fn unhashed(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            digest: None,
            size,
            is_symlink: false,
        }
    }

    /// Whether the file was hashed.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.digest.is_some()
    }
}

/// Result of one traversal pass.
///
/// Records are keyed by path; the ordered map keeps discovery order
/// (and therefore group numbering) stable between runs.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// One record per regular file visited
    pub records: BTreeMap<PathBuf, FileRecord>,
    /// Recoverable errors met while walking or hashing
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Insert a record. A second record for the same path replaces the first.
    pub fn insert(&mut self, record: FileRecord) {
        self.records.insert(record.path.clone(), record);
    }

    /// Number of records in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no file was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records without a digest.
    #[must_use]
    pub fn unhashed_count(&self) -> usize {
        self.records.values().filter(|r| !r.is_hashed()).count()
    }

    /// Total size of all recorded files.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.records.values().map(|r| r.size).sum()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Directories pruned from the walk, e.g. the quarantine directory.
    pub exclude_dirs: Vec<PathBuf>,
}

impl WalkerConfig {
    /// Set hidden-file skipping.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Add a directory to prune from the walk.
    #[must_use]
    pub fn with_excluded_dir(mut self, dir: PathBuf) -> Self {
        self.exclude_dirs.push(dir);
        self
    }
}

/// Errors that can occur during directory scanning.
///
/// None of these abort a scan; they are collected and reported.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path disappeared between listing and access.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file was listed but its content could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::Io { path: p, .. } => p,
            Self::Hash(e) => e.path(),
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished before it could be opened.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Interrupted(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}
