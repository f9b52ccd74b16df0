//! Thread-safe duplicate index.
//!
//! The index is the only owner of mutable scan state. Hashing tasks call
//! [`DuplicateIndex::record`]; the walker calls the `mark_*` methods. Every
//! mutation takes the same lock, and only for the map/vector update itself.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::groups::{DuplicateGroup, DuplicateKey, FileRecord, ScanResult};

#[derive(Debug, Default)]
struct IndexState {
    groups: HashMap<DuplicateKey, DuplicateGroup>,
    duplicate_keys: HashSet<DuplicateKey>,
    zero_length: Vec<PathBuf>,
    oversize: Vec<PathBuf>,
}

/// Accumulates records into groups keyed by `(size, digest)`.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    state: Mutex<IndexState>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Each mutation is a single insert or push, so a poisoned lock still
    // guards consistent data.
    fn lock(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a successfully hashed file.
    ///
    /// Returns `true` if this record turned its key into a duplicate.
    pub fn record(&self, record: FileRecord) -> bool {
        let key = record.key();
        let mut guard = self.lock();
        let state = &mut *guard;
        match state.groups.entry(key) {
            Entry::Occupied(mut slot) => {
                let group = slot.get_mut();
                group.push(record);
                if group.len() == 2 {
                    let key = slot.key().clone();
                    state.duplicate_keys.insert(key);
                    return true;
                }
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(DuplicateGroup::new(record));
                false
            }
        }
    }

    /// Note a zero-length file.
    pub fn mark_zero_length(&self, path: PathBuf) {
        self.lock().zero_length.push(path);
    }

    /// Note a file above the size ceiling.
    pub fn mark_oversize(&self, path: PathBuf) {
        self.lock().oversize.push(path);
    }

    #[cfg(test)]
    fn is_duplicate(&self, key: &DuplicateKey) -> bool {
        self.lock().duplicate_keys.contains(key)
    }

    #[cfg(test)]
    fn key_count(&self) -> usize {
        self.lock().groups.len()
    }

    /// Consume the index once all writers are done.
    #[must_use]
    pub fn into_result(self) -> ScanResult {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        ScanResult {
            groups: state.groups,
            duplicate_keys: state.duplicate_keys,
            zero_length_paths: state.zero_length,
            oversize_paths: state.oversize,
        }
    }
}
