//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! The walker is the single producer of the scan pipeline. It visits the
//! tree on the calling thread, in file-name order within each directory,
//! and yields one [`FileEntry`] per non-directory entry. Symbolic links are
//! reported but never followed.
//!
//! Errors are yielded as [`ScanError`] values rather than stopping
//! iteration, so one unreadable directory only loses its own subtree.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::Walker;
//! use std::path::Path;
//!
//! let files: Vec<_> = Walker::new(Path::new(".")).walk().filter_map(Result::ok).collect();
//! println!("Found {} entries", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::filter::NamePatterns;
use super::{FileEntry, FileKind, ScanError};

/// Sequential directory walker.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Walk the tree, yielding every non-directory entry.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let root = self.root.as_path();
        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |result| match result {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }
                    Some(to_file_entry(&entry))
                }
                Err(err) => Some(Err(walk_error(err, root))),
            })
    }
}

fn to_file_entry(entry: &DirEntry) -> Result<FileEntry, ScanError> {
    let file_type = entry.file_type();
    let kind = if file_type.is_file() {
        FileKind::Regular
    } else if file_type.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::Other
    };

    let metadata = entry
        .metadata()
        .map_err(|e| walk_error(e, entry.path()))?;
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    Ok(FileEntry::new(entry.path().to_path_buf(), metadata.len(), modified).with_kind(kind))
}

fn walk_error(err: walkdir::Error, fallback: &Path) -> ScanError {
    let path = err
        .path()
        .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    ScanError::from_io(path, source)
}

/// Count regular files whose base name matches `patterns`.
///
/// This is the optional pre-count pass used for progress percentages. It is
/// a plain sequential walk; traversal errors are logged and skipped.
#[must_use]
pub fn count_matching(root: &Path, patterns: &NamePatterns, detail: usize) -> usize {
    let mut seen = 0usize;
    let mut matched = 0usize;

    for result in Walker::new(root).walk() {
        match result {
            Ok(entry) => {
                if !entry.is_regular() {
                    continue;
                }
                seen += 1;
                if patterns.matches_path(&entry.path) {
                    matched += 1;
                }
                if detail > 0 && seen % detail == 0 {
                    log::info!(
                        "Counted {} files of which {} matched. Currently in {}",
                        seen,
                        matched,
                        entry
                            .path
                            .parent()
                            .map_or_else(|| root.display(), Path::display)
                    );
                }
            }
            Err(e) => log::warn!("Error accessing entry while counting: {}", e),
        }
    }

    matched
}
