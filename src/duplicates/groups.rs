//! Digest grouping and the retention order of group members.
//!
//! # Overview
//!
//! [`group_by_digest`] partitions hashed records into equivalence classes
//! in a single pass. Classes with one member are dropped; every surviving
//! class becomes a [`DuplicateGroup`] whose members are stored in retention
//! order, so `files[0]` is the copy that stays.
//!
//! Equal digests are taken as equal content. [`verify_group`] can back that
//! up with a byte-for-byte comparison when the caller asks for it.
//!
//! # Example
//!
//! ```
//! use rmdupes::duplicates::group_by_digest;
//! use rmdupes::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/x"), [1u8; 32], 10),
//!     FileRecord::new(PathBuf::from("/z"), [1u8; 32], 10),
//!     FileRecord::new(PathBuf::from("/y"), [2u8; 32], 10),
//! ];
//!
//! let (groups, stats) = group_by_digest(records);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].retained().map(|f| f.path.clone()), Some(PathBuf::from("/z")));
//! assert_eq!(stats.unique, 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{files_identical, hash_to_hex, Digest, FileRecord, HashError};

/// Two or more files with identical content.
///
/// Members are kept in retention order: the first one is retained, the
/// rest are removable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 digest shared by every member
    pub digest: Digest,
    /// Size of one copy in bytes
    pub size: u64,
    /// Members, retained file first
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a group, putting `files` into retention order.
    #[must_use]
    pub fn new(digest: Digest, size: u64, mut files: Vec<FileRecord>) -> Self {
        retention_order(&mut files);
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file kept by the retention rule.
    #[must_use]
    pub fn retained(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Every member except the retained one.
    #[must_use]
    pub fn removable(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of redundant copies.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by removing every redundant copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as a hex string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Member paths in retention order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Sort members so that the lexically greatest path comes first.
///
/// Paths compare by their raw OS string, not component by component, so
/// `/a/b-c` sorts after `/a/b/c` exactly as the strings do. The result is a
/// pure function of the set of paths.
pub fn retention_order(files: &mut [FileRecord]) {
    files.sort_by(|a, b| b.path.as_os_str().cmp(a.path.as_os_str()));
}

/// Statistics from digest grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records offered to the grouper
    pub total_records: usize,
    /// Records without a digest, excluded from grouping
    pub unhashed: usize,
    /// Hashed records whose digest no other record shares
    pub unique: usize,
    /// Number of groups with 2+ members
    pub duplicate_groups: usize,
    /// Number of records that ended up in a group
    pub duplicate_files: usize,
}

/// Partition records by digest.
///
/// Groups come out in discovery order: a group's position is that of its
/// first member in `records`. Records without a digest never join a group.
///
/// Runs in O(n) time; no file I/O.
#[must_use]
pub fn group_by_digest(
    records: impl IntoIterator<Item = FileRecord>,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut slots: HashMap<Digest, usize> = HashMap::new();
    let mut buckets: Vec<(Digest, Vec<FileRecord>)> = Vec::new();

    for record in records {
        stats.total_records += 1;
        let Some(digest) = record.digest else {
            stats.unhashed += 1;
            log::trace!("Not grouping unhashed file: {}", record.path.display());
            continue;
        };
        let slot = *slots.entry(digest).or_insert_with(|| {
            buckets.push((digest, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(record);
    }

    let mut groups = Vec::new();
    for (digest, files) in buckets {
        if files.len() < 2 {
            stats.unique += files.len();
            continue;
        }
        stats.duplicate_groups += 1;
        stats.duplicate_files += files.len();
        let size = files[0].size;
        log::debug!(
            "Digest {} shared by {} files",
            &hash_to_hex(&digest)[..16],
            files.len()
        );
        groups.push(DuplicateGroup::new(digest, size, files));
    }

    log::debug!(
        "Grouping complete: {} records, {} groups, {} unique, {} unhashed",
        stats.total_records,
        stats.duplicate_groups,
        stats.unique,
        stats.unhashed
    );

    (groups, stats)
}

/// Split one digest group by direct byte comparison.
///
/// Each member is compared against the first member of every sub-class
/// found so far and joins the first one it matches. Sub-classes of 2+
/// members are returned in retention order. A member that cannot be read
/// is dropped and its error returned once. When the unreadable file is a
/// sub-class representative, the next member of that sub-class takes its
/// place and the comparison is retried.
#[must_use]
pub fn verify_group(group: DuplicateGroup) -> (Vec<DuplicateGroup>, Vec<HashError>) {
    let DuplicateGroup {
        digest,
        size,
        files,
    } = group;
    let mut classes: Vec<Vec<FileRecord>> = Vec::new();
    let mut errors = Vec::new();

    'members: for file in files {
        let mut i = 0;
        while i < classes.len() {
            match files_identical(&classes[i][0].path, &file.path) {
                Ok(true) => {
                    classes[i].push(file);
                    continue 'members;
                }
                Ok(false) => i += 1,
                Err(e) if e.path() == classes[i][0].path.as_path() => {
                    log::warn!("Cannot verify {}: {}", e.path().display(), e);
                    errors.push(e);
                    classes[i].remove(0);
                    if classes[i].is_empty() {
                        classes.remove(i);
                    }
                }
                Err(e) => {
                    log::warn!("Cannot verify {}: {}", file.path.display(), e);
                    errors.push(e);
                    continue 'members;
                }
            }
        }
        classes.push(vec![file]);
    }

    if classes.len() > 1 {
        log::warn!(
            "Digest {} covers {} distinct contents",
            hash_to_hex(&digest),
            classes.len()
        );
    }

    let groups = classes
        .into_iter()
        .filter(|class| class.len() >= 2)
        .map(|class| DuplicateGroup::new(digest, size, class))
        .collect();
    (groups, errors)
}

/// Verify every group, keeping their relative order.
#[must_use]
pub fn verify_groups(groups: Vec<DuplicateGroup>) -> (Vec<DuplicateGroup>, Vec<HashError>) {
    let mut verified = Vec::with_capacity(groups.len());
    let mut errors = Vec::new();
    for group in groups {
        let (split, errs) = verify_group(group);
        verified.extend(split);
        errors.extend(errs);
    }
    (verified, errors)
}
