//! Canonical copy extraction.
//!
//! # Overview
//!
//! For every duplicate group of a finished scan this module:
//! - Selects the member with the latest modification time
//! - Copies it into the destination directory under a free name
//! - Writes `<copy name>-dup-list.txt` listing every other member
//!
//! Names are claimed with create-new semantics. An existing file is never
//! overwritten: `photo.jpg` becomes `photo_1.jpg`, then `photo_2.jpg`, and
//! so on. Extraction is sequential and runs after the scan has finished.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::actions::extract::{extract_all, prepare_destination};
//! use dupescan::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let dest = Path::new("/tmp/uniques");
//! prepare_destination(dest).unwrap();
//!
//! let (result, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("/photos"))
//!     .unwrap();
//! let report = extract_all(&result, dest, None);
//! println!("{}", report.summary());
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::{DuplicateGroup, DuplicateKey, FileRecord, ScanResult};
use crate::progress::ProgressCallback;

/// Suffix appended to the copy name to form the manifest name.
pub const MANIFEST_SUFFIX: &str = "-dup-list.txt";

/// Error type for extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The destination directory could not be created.
    #[error("cannot create destination directory {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination exists but is not a directory.
    #[error("destination is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The group has fewer than two members.
    #[error("group {0} is not a duplicate group")]
    NotDuplicate(DuplicateKey),

    /// The canonical member has no file name component.
    #[error("cannot derive a file name from {0}")]
    NoFileName(PathBuf),

    /// Copying the canonical member failed.
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the manifest failed.
    #[error("failed to write manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExtractError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Destination { path, .. } | Self::Manifest { path, .. } => Some(path),
            Self::NotADirectory(p) | Self::NoFileName(p) => Some(p),
            Self::Copy { to, .. } => Some(to),
            Self::NotDuplicate(_) => None,
        }
    }
}

/// One group that was extracted.
#[derive(Debug, Clone)]
pub struct ExtractedGroup {
    /// Key of the group.
    pub key: DuplicateKey,
    /// Canonical member that was copied.
    pub source: PathBuf,
    /// Where the copy was written.
    pub copy: PathBuf,
    /// Where the manifest was written.
    pub manifest: PathBuf,
    /// Bytes copied.
    pub bytes: u64,
}

/// Results of an extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// Groups extracted successfully.
    pub extracted: Vec<ExtractedGroup>,
    /// Abandoned groups with their errors.
    pub failures: Vec<(DuplicateKey, String)>,
}

impl ExtractReport {
    /// Number of groups extracted.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.extracted.len()
    }

    /// Number of groups abandoned.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every group was extracted.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let bytes: u64 = self.extracted.iter().map(|g| g.bytes).sum();
        if self.all_succeeded() {
            format!(
                "Extracted {} group(s), copied {}",
                self.success_count(),
                bytesize::ByteSize::b(bytes)
            )
        } else {
            format!(
                "Extracted {} group(s), {} failed, copied {}",
                self.success_count(),
                self.failure_count(),
                bytesize::ByteSize::b(bytes)
            )
        }
    }
}

/// Create the destination directory if needed.
///
/// Call this before scanning: a destination that cannot be set up is fatal.
///
/// # Errors
///
/// Returns `Destination` if the directory cannot be created and
/// `NotADirectory` if the path exists as something else.
pub fn prepare_destination(dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dir).map_err(|source| ExtractError::Destination {
        path: dir.to_path_buf(),
        source,
    })?;
    if !dir.is_dir() {
        return Err(ExtractError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// The `n`th candidate name for `base`.
///
/// `n == 0` is `base` itself; otherwise `_n` is inserted before the
/// extension (`photo.jpg` → `photo_2.jpg`, `README` → `README_2`).
#[must_use]
pub fn candidate_name(base: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return base.to_path_buf();
    }
    let mut name: OsString = base.file_stem().unwrap_or_default().to_os_string();
    name.push(format!("_{n}"));
    if let Some(ext) = base.extension() {
        name.push(".");
        name.push(ext);
    }
    base.with_file_name(name)
}

/// Create a new file at the first free candidate name for `base`.
///
/// # Errors
///
/// Returns any I/O error other than `AlreadyExists`.
pub fn create_unique(base: &Path) -> io::Result<(File, PathBuf)> {
    let mut n = 0u32;
    loop {
        let candidate = candidate_name(base, n);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n = n.checked_add(1).ok_or(e)?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// The member with the latest modification time. Ties keep the earliest.
#[must_use]
pub fn select_canonical(group: &DuplicateGroup) -> Option<&FileRecord> {
    group.records().iter().fold(None, |best, record| match best {
        Some(b) if record.modified() <= b.modified() => Some(b),
        _ => Some(record),
    })
}

/// Stream `src` into an already-created destination file.
///
/// The destination is removed if the copy fails.
fn copy_into(src: &Path, mut dest: File, dest_path: &Path) -> Result<u64, ExtractError> {
    let copied = File::open(src).and_then(|mut input| {
        let bytes = io::copy(&mut input, &mut dest)?;
        dest.flush()?;
        Ok(bytes)
    });
    drop(dest);

    copied.map_err(|source| {
        if let Err(e) = fs::remove_file(dest_path) {
            log::warn!("Failed to remove partial copy {}: {}", dest_path.display(), e);
        }
        ExtractError::Copy {
            from: src.to_path_buf(),
            to: dest_path.to_path_buf(),
            source,
        }
    })
}

/// Write the manifest for `group` next to `copy`, listing every member
/// except `canonical`.
fn write_manifest(
    group: &DuplicateGroup,
    canonical: &FileRecord,
    copy: &Path,
) -> Result<PathBuf, ExtractError> {
    let mut base = copy.as_os_str().to_os_string();
    base.push(MANIFEST_SUFFIX);
    let base = PathBuf::from(base);

    let (file, path) = create_unique(&base).map_err(|source| ExtractError::Manifest {
        path: base.clone(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    let written = group
        .records()
        .iter()
        .filter(|r| r.path() != canonical.path())
        .try_for_each(|r| writeln!(writer, "{}", r.path().display()))
        .and_then(|()| writer.flush());

    match written {
        Ok(()) => Ok(path),
        Err(source) => {
            drop(writer);
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to remove partial manifest {}: {}", path.display(), e);
            }
            Err(ExtractError::Manifest { path, source })
        }
    }
}

/// Extract one duplicate group into `dest`.
///
/// If the manifest cannot be written the copy is removed again, so a group
/// is either fully extracted or leaves nothing behind.
///
/// # Errors
///
/// Returns `NotDuplicate` for groups with fewer than two members, or the
/// copy/manifest error that abandoned the group.
pub fn extract_group(group: &DuplicateGroup, dest: &Path) -> Result<ExtractedGroup, ExtractError> {
    let canonical = match select_canonical(group) {
        Some(c) if group.is_duplicate() => c,
        _ => return Err(ExtractError::NotDuplicate(group.key().clone())),
    };
    let name = canonical
        .path()
        .file_name()
        .ok_or_else(|| ExtractError::NoFileName(canonical.path().to_path_buf()))?;
    let base = dest.join(name);

    let (file, copy) = create_unique(&base).map_err(|source| ExtractError::Copy {
        from: canonical.path().to_path_buf(),
        to: base.clone(),
        source,
    })?;
    if copy != base {
        log::info!(
            "File {} already exists, using {} instead",
            base.display(),
            copy.display()
        );
    }

    let bytes = copy_into(canonical.path(), file, &copy)?;

    let manifest = match write_manifest(group, canonical, &copy) {
        Ok(m) => m,
        Err(e) => {
            if let Err(rm) = fs::remove_file(&copy) {
                log::warn!("Failed to remove copy {}: {}", copy.display(), rm);
            }
            return Err(e);
        }
    };

    log::debug!(
        "Extracted {} -> {} ({} bytes)",
        canonical.path().display(),
        copy.display(),
        bytes
    );

    Ok(ExtractedGroup {
        key: group.key().clone(),
        source: canonical.path().to_path_buf(),
        copy,
        manifest,
        bytes,
    })
}

/// Extract every duplicate group of `result` into `dest`, in key order.
///
/// A failing group is logged and recorded; the remaining groups are still
/// processed.
pub fn extract_all(
    result: &ScanResult,
    dest: &Path,
    progress: Option<&dyn ProgressCallback>,
) -> ExtractReport {
    let groups = result.duplicate_groups();
    let mut report = ExtractReport::default();

    if let Some(cb) = progress {
        cb.on_phase_start("extracting", groups.len());
    }

    for (index, group) in groups.into_iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_progress(index + 1, &group.key().to_string());
        }

        match extract_group(group, dest) {
            Ok(extracted) => report.extracted.push(extracted),
            Err(e) => {
                log::warn!("Skipping extraction of group {}: {}", group.key(), e);
                report.failures.push((group.key().clone(), e.to_string()));
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end("extracting");
    }

    log::info!("{}", report.summary());

    report
}
