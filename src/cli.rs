//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, error format) and
//! subcommands for different operations.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! dupescan scan
//!
//! # Eight hashing tasks, JPEGs only, nothing above 1 GiB
//! dupescan scan ~/Pictures -j 8 -r '\.jpe?g$' --max-size 1GiB
//!
//! # Copy one file per duplicate group into ./uniques and write a JSON report
//! dupescan scan ~/Pictures --extract-to uniques --json report.json
//!
//! # Count matching files only
//! dupescan count ~/Pictures -r '\.png$'
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bytes per unit of `--max-mb`.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Concurrent duplicate file scanner.
///
/// dupescan hashes files in parallel (BLAKE3), groups them by size and
/// content digest, and can copy one canonical file per duplicate group to a
/// destination directory.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Read defaults from this config file instead of the platform default
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupescan.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Count the files a scan would consider
    Count(CountArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Maximum number of files hashed at the same time
    #[arg(short = 'j', long, value_name = "N", value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Skip files larger than this (e.g., 500MB, 2GiB; 0 = unlimited)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip files larger than N mebibytes (0 = unlimited)
    #[arg(long, value_name = "N", conflicts_with = "max_size")]
    pub max_mb: Option<u64>,

    /// Only consider files whose name matches (can be specified multiple times)
    ///
    /// Regular expressions, matched against the file's base name. A file is
    /// considered if any pattern matches.
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Log a progress line every N files (0 disables)
    #[arg(long, value_name = "N")]
    pub detail: Option<usize>,

    /// Count matching files first so progress can show percentages
    #[arg(long)]
    pub precount: bool,

    /// Write a JSON report to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Copy one canonical file per duplicate group into this directory
    #[arg(long, value_name = "DIR")]
    pub extract_to: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Size ceiling in bytes from `--max-size` or `--max-mb`.
    ///
    /// `Some(0)` is passed through; the filter treats it as unlimited.
    #[must_use]
    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size
            .or_else(|| self.max_mb.map(|mb| mb.saturating_mul(BYTES_PER_MB)))
    }
}

/// Arguments for the count subcommand.
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Directory path to count
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Only count files whose name matches (can be specified multiple times)
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    pub patterns: Vec<String>,
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if n == 0 {
        return Err("Concurrency must be at least 1".to_string());
    }
    Ok(n)
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
