//! File identity tracking for symlink alias detection.
//!
//! A symlink to a regular file resolves to the same `(device, inode)` as its
//! target. The two hash equal but are not copies: removing the target as
//! "the duplicate" leaves the link dangling and loses the only data. The
//! walker therefore yields a file once when a symlink is involved, whichever
//! of link and target comes first.
//!
//! Hardlinks are different: every name is a full reference to the data, so
//! removing one never loses content. Hardlinked names are yielded and group
//! like any other identical files.
//!
//! # Platform Support
//!
//! - **Unix**: `(device_id, inode)` from the resolved metadata
//! - **Other**: detection disabled, every entry counts as a distinct file

use std::collections::HashMap;
use std::fs::Metadata;

/// Remembers the identity of every file yielded so far, and whether it was
/// first reached through a symlink.
///
/// Not thread-safe; the walker owns one per traversal.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashMap<FileIdentity, bool>,
}

impl IdentityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry and report whether it must be skipped as an alias.
    ///
    /// An entry is an alias when its file was already yielded and either
    /// this entry or the first one seen is a symlink. `metadata` must be
    /// the *resolved* metadata (`std::fs::metadata`), so that a symlink and
    /// its target map to the same identity.
    pub fn is_alias(&mut self, metadata: &Metadata, is_symlink: bool) -> bool {
        let Some(id) = FileIdentity::from_metadata(metadata) else {
            return false;
        };
        match self.seen.get(&id) {
            Some(&first_was_symlink) => is_symlink || first_was_symlink,
            None => {
                self.seen.insert(id, is_symlink);
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    // TODO: use GetFileInformationByHandle (volume serial + file index) on Windows.
    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
