//! Bounded hashing scheduler.
//!
//! # Overview
//!
//! [`DuplicateFinder`] drives one scan:
//! 1. **Walk** - the calling thread walks the tree and classifies each entry
//! 2. **Submit** - each eligible file takes a permit and is spawned onto a
//!    rayon pool of `Q` threads; the walk continues without waiting
//! 3. **Record** - each task publishes its record to the [`DuplicateIndex`]
//!    and releases its permit, success or failure
//! 4. **Join** - the scope waits for every outstanding task before the
//!    result is handed back
//!
//! Acquiring a permit is the only place the walker blocks. There is no
//! cancellation: once a file is submitted its hash runs to completion.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_concurrency(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let (result, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! for group in result.duplicate_groups() {
//!     println!("{}: {} files", group.key(), group.len());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::groups::{FileRecord, ScanResult};
use super::index::DuplicateIndex;
use super::permits::PermitPool;
use crate::progress::ProgressCallback;
use crate::scanner::{
    Digester, Eligibility, EligibilityFilter, FileEntry, Hasher, NamePatterns, ScanError, Walker,
};

/// Default number of concurrent hashing tasks.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default walk interval between progress log lines.
pub const DEFAULT_DETAIL: usize = 77;

/// Files above this size get start/finish notices in the log (4 GiB).
pub const LARGE_FILE_THRESHOLD: u64 = 4 * 1024 * 1024 * 1024;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of hashing tasks running at once (`Q`).
    pub concurrency: usize,
    /// Size ceiling and name patterns.
    pub filter: EligibilityFilter,
    /// Log a progress line every `detail` walked files (0 disables).
    pub detail: usize,
    /// Expected number of files, from a pre-count.
    pub total_hint: Option<usize>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("concurrency", &self.concurrency)
            .field("filter", &self.filter)
            .field("detail", &self.detail)
            .field("total_hint", &self.total_hint)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            filter: EligibilityFilter::default(),
            detail: DEFAULT_DETAIL,
            total_hint: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the concurrency limit (minimum 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the size ceiling in bytes. `None` or `Some(0)` means unlimited.
    #[must_use]
    pub fn with_max_size(mut self, max_size: Option<u64>) -> Self {
        self.filter = EligibilityFilter::new(max_size, self.filter.patterns);
        self
    }

    /// Set the base-name patterns.
    #[must_use]
    pub fn with_patterns(mut self, patterns: NamePatterns) -> Self {
        self.filter = EligibilityFilter::new(self.filter.max_size, patterns);
        self
    }

    /// Set the progress log interval.
    #[must_use]
    pub fn with_detail(mut self, detail: usize) -> Self {
        self.detail = detail;
        self
    }

    /// Set the expected file count used for percentages.
    #[must_use]
    pub fn with_total_hint(mut self, total: Option<usize>) -> Self {
        self.total_hint = total;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Regular files seen by the walk
    pub files_walked: usize,
    /// Files submitted for hashing
    pub eligible_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files whose hash failed (excluded from every group)
    pub failed_files: usize,
    /// Zero-length files
    pub zero_length_files: usize,
    /// Files above the size ceiling
    pub oversize_files: usize,
    /// Files skipped because no name pattern matched
    pub skipped_by_pattern: usize,
    /// Symlinks and other non-regular entries skipped
    pub skipped_non_regular: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Members beyond the first across duplicate groups
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub reclaimable_space: u64,
    /// Highest number of hashing tasks observed running at once
    pub peak_concurrency: usize,
    /// Wall time of the scan
    pub scan_duration: Duration,
    /// Traversal errors (entries skipped)
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.failed_files > 0 || !self.scan_errors.is_empty()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }
}

/// Errors that abort a scan before any file is hashed.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The hashing worker pool could not be created.
    #[error("Failed to start hashing workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error occurred while inspecting the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[derive(Default)]
struct HashCounters {
    hashed: AtomicUsize,
    failed: AtomicUsize,
}

/// Duplicate finder: walker, bounded hashing pool and index wired together.
pub struct DuplicateFinder {
    config: FinderConfig,
    digester: Arc<dyn Digester>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder hashing with BLAKE3.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            digester: Arc::new(Hasher::new()),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Replace the digester used by hashing tasks.
    #[must_use]
    pub fn with_digester(mut self, digester: Arc<dyn Digester>) -> Self {
        self.digester = digester;
        self
    }

    /// Scan the tree under `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the root is missing or not a directory, or
    /// if the worker pool cannot be built. Per-file failures never surface
    /// here; they are logged and counted in the summary.
    pub fn find_duplicates(&self, root: &Path) -> Result<(ScanResult, ScanSummary), FinderError> {
        let metadata = std::fs::metadata(root).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FinderError::PathNotFound(root.to_path_buf())
            } else {
                FinderError::Io {
                    path: root.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if !metadata.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        log::info!(
            "Starting duplicate scan of {} with {} hashing task(s)",
            root.display(),
            self.config.concurrency
        );

        self.scan_entries(Walker::new(root).walk())
    }

    /// Run the scheduler over an already-produced entry sequence.
    ///
    /// Entries are consumed on the calling thread in iteration order.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::ThreadPool` if the worker pool cannot be built.
    pub fn scan_entries<I>(&self, entries: I) -> Result<(ScanResult, ScanSummary), FinderError>
    where
        I: IntoIterator<Item = Result<FileEntry, ScanError>>,
    {
        let start_time = Instant::now();
        let concurrency = self.config.concurrency.max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("dupescan-hash-{i}"))
            .build()?;
        let permits = PermitPool::new(concurrency);
        let index = DuplicateIndex::new();
        let counters = HashCounters::default();
        let digester: &dyn Digester = self.digester.as_ref();

        let mut summary = ScanSummary::default();
        let mut processed = 0usize;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scanning", self.config.total_hint.unwrap_or(0));
        }

        pool.in_place_scope(|scope| {
            for result in entries {
                let entry = match result {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("Error accessing entry, skipped: {}", e);
                        summary.scan_errors.push(e);
                        continue;
                    }
                };

                if !entry.is_regular() {
                    log::trace!("Skipping non-regular entry: {}", entry.path.display());
                    summary.skipped_non_regular += 1;
                    continue;
                }

                summary.files_walked += 1;
                // Same population as the pre-count, so percentages line up.
                if self.config.filter.patterns.matches_path(&entry.path) {
                    processed += 1;
                    self.report_progress(processed, &entry.path);
                }

                match self.config.filter.classify(&entry) {
                    Eligibility::Eligible => {
                        summary.eligible_files += 1;
                        let permit = permits.acquire();
                        let index = &index;
                        let counters = &counters;
                        scope.spawn(move |_| {
                            let _permit = permit;
                            hash_entry(digester, entry, index, counters);
                        });
                    }
                    Eligibility::ZeroLength => {
                        log::trace!("Zero-length file: {}", entry.path.display());
                        summary.zero_length_files += 1;
                        index.mark_zero_length(entry.path);
                    }
                    Eligibility::Oversize => {
                        log::info!(
                            "Skipping very large {} file: {}",
                            ByteSize::b(entry.size),
                            entry.path.display()
                        );
                        summary.oversize_files += 1;
                        index.mark_oversize(entry.path);
                    }
                    Eligibility::NameMismatch => {
                        log::trace!("No pattern matched: {}", entry.path.display());
                        summary.skipped_by_pattern += 1;
                    }
                    Eligibility::NotRegular => {
                        summary.skipped_non_regular += 1;
                    }
                }
            }
        });

        let result = index.into_result();

        summary.hashed_files = counters.hashed.load(Ordering::SeqCst);
        summary.failed_files = counters.failed.load(Ordering::SeqCst);
        summary.peak_concurrency = permits.peak();
        summary.duplicate_groups = result.duplicate_keys.len();
        summary.duplicate_files = result.duplicate_file_count();
        summary.reclaimable_space = result.reclaimable_space();
        summary.scan_duration = start_time.elapsed();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scanning");
        }

        log::info!(
            "Scan complete: {} files walked, {} hashed, {} failed, {} duplicate group(s), {} reclaimable in {:.2?}",
            summary.files_walked,
            summary.hashed_files,
            summary.failed_files,
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.scan_duration
        );

        Ok((result, summary))
    }

    fn report_progress(&self, count: usize, path: &Path) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(count, &path.to_string_lossy());
        }

        let detail = self.config.detail;
        if detail == 0 || count % detail != 0 {
            return;
        }
        let dir = path.parent().unwrap_or(path).display();
        match self.config.total_hint {
            Some(total) if total > 0 => log::info!(
                "Processed {} of {} files ({:.2}%). {}",
                count,
                total,
                count as f64 / total as f64 * 100.0,
                dir
            ),
            _ => log::info!("Processed {} files. {}", count, dir),
        }
    }
}

fn hash_entry(
    digester: &dyn Digester,
    entry: FileEntry,
    index: &DuplicateIndex,
    counters: &HashCounters,
) {
    let large = entry.size > LARGE_FILE_THRESHOLD;
    if large {
        log::info!(
            "Processing large ({}) file: {}",
            ByteSize::b(entry.size),
            entry.path.display()
        );
    }
    let started = Instant::now();

    match digester.digest(&entry.path) {
        Ok(digest) => {
            if large {
                log::info!(
                    "File processed in {:.2?}: {}",
                    started.elapsed(),
                    entry.path.display()
                );
            }
            log::trace!("Hashed {}: {}", entry.path.display(), digest);
            counters.hashed.fetch_add(1, Ordering::SeqCst);
            index.record(FileRecord::new(
                entry.path,
                entry.size,
                digest,
                entry.modified,
            ));
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            log::warn!("Error hashing file, excluded from results: {}", e);
        }
    }
}
