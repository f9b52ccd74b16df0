//! Scanner module for directory traversal, eligibility and content hashing.
//!
//! This module provides functionality for:
//! - Single-threaded directory walking using walkdir
//! - Eligibility filtering (file kind, size, name patterns)
//! - Streaming content digests with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and the pre-count walk
//! - [`filter`]: Pure eligibility rules applied to each walked entry
//! - [`hasher`]: BLAKE3 file hashing (streaming, buffer reuse per thread)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{EligibilityFilter, Walker};
//! use std::path::Path;
//!
//! let filter = EligibilityFilter::default();
//! for entry in Walker::new(Path::new(".")).walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {:?}", file.path.display(), filter.classify(&file)),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod filter;
pub mod hasher;
pub mod walker;

use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use filter::{eligible, Eligibility, EligibilityFilter, NamePatterns};
pub use hasher::{Digester, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::{count_matching, Walker};

/// Kind of a walked directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A regular file.
    Regular,
    /// A symbolic link (never followed).
    Symlink,
    /// Anything else: devices, sockets, FIFOs.
    Other,
}

/// Metadata for a discovered, non-directory entry.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path to the entry as produced by the walk
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// What kind of entry this is
    pub kind: FileKind,
}

impl FileEntry {
    /// Create a new regular-file entry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            kind: FileKind::Regular,
        }
    }

    /// Override the entry kind.
    #[must_use]
    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this entry is a regular file.
    #[must_use]
    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::Regular
    }
}

/// Errors that can occur during directory traversal.
///
/// All of these are non-fatal: the entry is skipped and the walk goes on.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry disappeared between listing and stat.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while visiting `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur during file hashing.
///
/// A hash error always means "no digest": callers drop the file rather than
/// grouping it under a placeholder value.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while opening or reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
