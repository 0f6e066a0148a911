//! Directory walker built on jwalk.
//!
//! # Overview
//!
//! [`Walker`] enumerates every regular file below a root directory. Children
//! of each directory are sorted by name, so two walks of an unchanged tree
//! yield the same sequence.
//!
//! # Behavior
//!
//! - Directories are never yielded, only descended into
//! - Symlinks are never descended into; a symlink that resolves to a regular
//!   file is yielded with `is_symlink = true`
//! - A symlink and its target are yielded once, whichever comes first
//!   (see [`IdentityTracker`]); hardlinked names are all yielded
//! - A subdirectory that cannot be listed produces one
//!   [`ScanError::PermissionDenied`] and the walk moves on
//! - Directories in [`WalkerConfig::exclude_dirs`] are pruned
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_skip_hidden(true);
//! let walker = Walker::new(Path::new("/home/user/Pictures"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::identity::IdentityTracker;
use super::{ScanError, WalkerConfig};

/// A regular file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path as reached from the root (not canonicalized)
    pub path: PathBuf,
    /// Size of the file, or of the symlink target
    pub size: u64,
    /// Whether the path itself is a symbolic link
    pub is_symlink: bool,
}

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a walker rooted at `path`.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag.
    ///
    /// Once the flag reads `true` the iterator ends at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding files and recoverable errors.
    ///
    /// Errors never end the iteration; callers collect them and carry on.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkedFile, ScanError>> + '_ {
        let mut identities = IdentityTracker::new();
        let excluded = self.config.exclude_dirs.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                if !excluded.is_empty() {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let pruned =
                                entry.file_type().is_dir() && excluded.contains(&entry.path());
                            if pruned {
                                log::debug!("Pruning excluded directory: {}", entry.path().display());
                            }
                            !pruned
                        }
                        Err(_) => true,
                    });
                }
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return entry
                            .read_children_error
                            .as_ref()
                            .map(|e| Err(self.classify_walk_error(path, e)));
                    }

                    let is_symlink = file_type.is_symlink();
                    // Resolved metadata, so a symlink reports its target
                    let metadata = match std::fs::metadata(&path) {
                        Ok(m) => m,
                        Err(e) if is_symlink && e.kind() == ErrorKind::NotFound => {
                            log::debug!("Skipping dangling symlink: {}", path.display());
                            return None;
                        }
                        Err(e) => return Some(Err(self.classify_io_error(path, e))),
                    };

                    if !metadata.is_file() {
                        log::trace!("Skipping non-regular entry: {}", path.display());
                        return None;
                    }

                    if identities.is_alias(&metadata, is_symlink) {
                        log::debug!("Skipping symlink alias of a seen file: {}", path.display());
                        return None;
                    }

                    Some(Ok(WalkedFile {
                        path,
                        size: metadata.len(),
                        is_symlink,
                    }))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(self.classify_walk_error(path, &e)))
                }
            })
    }

    fn classify_io_error(&self, path: PathBuf, error: std::io::Error) -> ScanError {
        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path,
                    source: error,
                }
            }
        }
    }

    fn classify_walk_error(&self, path: PathBuf, error: &jwalk::Error) -> ScanError {
        let source = match error.io_error() {
            Some(io) => std::io::Error::new(io.kind(), error.to_string()),
            None => std::io::Error::other(error.to_string()),
        };
        self.classify_io_error(path, source)
    }
}
