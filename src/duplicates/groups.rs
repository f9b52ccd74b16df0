//! Scan result types: records, keys, groups.
//!
//! # Overview
//!
//! A [`FileRecord`] is created exactly once per successfully hashed file.
//! Records sharing a [`DuplicateKey`] (size plus digest) form a
//! [`DuplicateGroup`]. The finished [`ScanResult`] is a plain value owned by
//! the caller; nothing in it is shared or locked.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{DuplicateKey, FileRecord};
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let a = FileRecord::new(PathBuf::from("/a"), 3, "abc".into(), SystemTime::now());
//! let b = FileRecord::new(PathBuf::from("/b"), 3, "abc".into(), SystemTime::now());
//! assert_eq!(a.key(), b.key());
//! assert_eq!(a.key().to_string(), "3:abc");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One successfully hashed file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    size: u64,
    digest: String,
    modified: SystemTime,
}

impl FileRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, digest: String, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            digest,
            modified,
        }
    }

    /// Path the file was found at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hex content digest.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Modification time observed during the walk.
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// The key this record groups under.
    #[must_use]
    pub fn key(&self) -> DuplicateKey {
        DuplicateKey::new(self.size, self.digest.clone())
    }
}

/// `(size, digest)`: two records are duplicates iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey {
    /// File size in bytes
    pub size: u64,
    /// Hex content digest
    pub digest: String,
}

impl DuplicateKey {
    /// Create a new key.
    #[must_use]
    pub fn new(size: u64, digest: String) -> Self {
        Self { size, digest }
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.size, self.digest)
    }
}

/// All records sharing one key, in the order hashing tasks completed.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    key: DuplicateKey,
    records: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Start a group from its first record.
    #[must_use]
    pub fn new(first: FileRecord) -> Self {
        Self {
            key: first.key(),
            records: vec![first],
        }
    }

    /// Append a record with the same key.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the record's key differs from the group's.
    pub fn push(&mut self, record: FileRecord) {
        debug_assert_eq!(
            (record.size(), record.digest()),
            (self.key.size, self.key.digest.as_str()),
            "record {} does not belong to group {}",
            record.path().display(),
            self.key
        );
        self.records.push(record);
    }

    /// The shared key.
    #[must_use]
    pub fn key(&self) -> &DuplicateKey {
        &self.key
    }

    /// Members in completion order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for groups built through [`DuplicateGroup::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether this group holds at least two members.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.records.len() > 1
    }

    /// Bytes that would be freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.key.size * self.records.len().saturating_sub(1) as u64
    }

    /// Member paths, sorted for stable presentation.
    #[must_use]
    pub fn sorted_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.records.iter().map(FileRecord::path).collect();
        paths.sort();
        paths
    }
}

/// Everything a finished scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Every key seen, with its group (including one-member groups)
    pub groups: HashMap<DuplicateKey, DuplicateGroup>,
    /// Keys whose group reached two members
    pub duplicate_keys: HashSet<DuplicateKey>,
    /// Zero-length regular files, never hashed
    pub zero_length_paths: Vec<PathBuf>,
    /// Files above the size ceiling, never hashed
    pub oversize_paths: Vec<PathBuf>,
}

impl ScanResult {
    /// Whether `key` was flagged as a duplicate.
    #[must_use]
    pub fn is_duplicate(&self, key: &DuplicateKey) -> bool {
        self.duplicate_keys.contains(key)
    }

    /// Duplicate groups in ascending key order.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<&DuplicateGroup> {
        let mut keys: Vec<&DuplicateKey> = self.duplicate_keys.iter().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| self.groups.get(key))
            .collect()
    }

    /// Group containing `path`, if it was hashed.
    #[must_use]
    pub fn group_of(&self, path: &Path) -> Option<&DuplicateGroup> {
        self.groups
            .values()
            .find(|g| g.records().iter().any(|r| r.path() == path))
    }

    /// Total number of hashed files across all groups.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.groups.values().map(DuplicateGroup::len).sum()
    }

    /// Number of members beyond the first in every duplicate group.
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.duplicate_groups()
            .iter()
            .map(|g| g.len().saturating_sub(1))
            .sum()
    }

    /// Bytes reclaimable by keeping one copy per duplicate group.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.duplicate_groups()
            .iter()
            .map(|g| g.wasted_space())
            .sum()
    }
}
