//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Digest-based grouping with a deterministic retention order
//! - Optional byte-for-byte verification of groups
//! - The scan pipeline tying walker, hasher and grouping together

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    group_by_digest, retention_order, verify_group, verify_groups, DuplicateGroup, GroupingStats,
};
