//! Duplicate detection module.
//!
//! This module provides:
//! - The bounded hashing scheduler ([`DuplicateFinder`])
//! - The thread-safe index hashing tasks publish into ([`DuplicateIndex`])
//! - The permit pool that caps in-flight hashes ([`PermitPool`])
//! - Result types: records, keys and groups

pub mod finder;
pub mod groups;
pub mod index;
pub mod permits;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_CONCURRENCY, DEFAULT_DETAIL,
    LARGE_FILE_THRESHOLD,
};
pub use groups::{DuplicateGroup, DuplicateKey, FileRecord, ScanResult};
pub use index::DuplicateIndex;
pub use permits::{Permit, PermitPool};
