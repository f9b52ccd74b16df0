//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "key": "1024:af13...",
//!       "size": 1024,
//!       "digest": "af13...",
//!       "files": [
//!         { "path": "a/x.txt", "size": 1024, "digest": "af13...", "modified": "2024-05-01T10:00:00+00:00" }
//!       ]
//!     }
//!   ],
//!   "duplicate_keys": ["1024:af13..."],
//!   "zero_length_files": ["a/empty"],
//!   "oversize_files": [],
//!   "max_size": null,
//!   "summary": { "files_walked": 12, "hashed_files": 11, "exit_code_name": "DS000", ... }
//! }
//! ```
//!
//! Every group is listed, including one-member groups; `duplicate_keys`
//! names the groups with two or more members.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::error::ExitCode;
//! use dupescan::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (result, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&result, &summary, None, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, FileRecord, ScanResult, ScanSummary};
use crate::error::ExitCode;

/// A single hashed file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileRecord {
    /// Path as found during the walk
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// BLAKE3 digest as hexadecimal string (64 characters)
    pub digest: String,
    /// Modification time, RFC 3339
    pub modified: String,
}

impl JsonFileRecord {
    /// Convert a record.
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path().to_string_lossy().into_owned(),
            size: record.size(),
            digest: record.digest().to_string(),
            modified: DateTime::<Utc>::from(record.modified()).to_rfc3339(),
        }
    }
}

/// A single group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// `size:digest`
    pub key: String,
    /// File size in bytes
    pub size: u64,
    /// Shared digest
    pub digest: String,
    /// Members, sorted by path
    pub files: Vec<JsonFileRecord>,
}

impl JsonGroup {
    /// Convert a group, sorting members by path.
    #[must_use]
    pub fn from_group(group: &DuplicateGroup) -> Self {
        let mut records: Vec<&FileRecord> = group.records().iter().collect();
        records.sort_by(|a, b| a.path().cmp(b.path()));
        Self {
            key: group.key().to_string(),
            size: group.key().size,
            digest: group.key().digest.clone(),
            files: records.into_iter().map(JsonFileRecord::from_record).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Regular files seen by the walk
    pub files_walked: usize,
    /// Files submitted for hashing
    pub eligible_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files whose hash failed
    pub failed_files: usize,
    /// Zero-length files
    pub zero_length_files: usize,
    /// Files above the size ceiling
    pub oversize_files: usize,
    /// Files skipped by name patterns
    pub skipped_by_pattern: usize,
    /// Non-regular entries skipped
    pub skipped_non_regular: usize,
    /// Traversal errors
    pub scan_errors: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files beyond the first per group
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub reclaimable_space: u64,
    /// Peak concurrent hashing tasks
    pub peak_concurrency: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            files_walked: summary.files_walked,
            eligible_files: summary.eligible_files,
            hashed_files: summary.hashed_files,
            failed_files: summary.failed_files,
            zero_length_files: summary.zero_length_files,
            oversize_files: summary.oversize_files,
            skipped_by_pattern: summary.skipped_by_pattern,
            skipped_non_regular: summary.skipped_non_regular,
            scan_errors: summary.scan_errors.len(),
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            peak_concurrency: summary.peak_concurrency,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Every group, in key order
    pub groups: Vec<JsonGroup>,
    /// Keys of groups with two or more members, sorted
    pub duplicate_keys: Vec<String>,
    /// Zero-length files
    pub zero_length_files: Vec<String>,
    /// Files above the size ceiling
    pub oversize_files: Vec<String>,
    /// Size ceiling in bytes, if any
    pub max_size: Option<u64>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a scan result, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{ScanResult, ScanSummary};
    /// use dupescan::error::ExitCode;
    /// use dupescan::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanResult::default(), &ScanSummary::default(), None, ExitCode::NoDuplicates);
    /// assert!(output.groups.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(
        result: &ScanResult,
        summary: &ScanSummary,
        max_size: Option<u64>,
        exit_code: ExitCode,
    ) -> Self {
        let mut groups: Vec<&DuplicateGroup> = result.groups.values().collect();
        groups.sort_by(|a, b| a.key().cmp(b.key()));

        let mut duplicate_keys: Vec<_> = result.duplicate_keys.iter().collect();
        duplicate_keys.sort();

        Self {
            groups: groups.into_iter().map(JsonGroup::from_group).collect(),
            duplicate_keys: duplicate_keys.into_iter().map(ToString::to_string).collect(),
            zero_length_files: sorted_strings(&result.zero_length_paths),
            oversize_files: sorted_strings(&result.oversize_paths),
            max_size,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write pretty-printed JSON to a new or truncated file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> Result<(), JsonOutputError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, true)?;
        writer.flush()?;
        Ok(())
    }
}

fn sorted_strings(paths: &[std::path::PathBuf]) -> Vec<String> {
    let mut out: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    out.sort();
    out
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
