//! Plain text report.
//!
//! ```text
//! Duplicate files found for 6:8f4c...:
//!   a/one.txt
//!   b/one.txt
//!
//! Zero length files:
//!   a/empty
//!
//! Oversize files:
//!
//! Done.
//! Total run time: 12.31ms
//! ```

use std::io::{self, Write};
use std::time::Duration;

use crate::duplicates::ScanResult;

/// Write the report for `result` to `writer`.
///
/// Groups appear in key order and members sorted by path, so the output is
/// stable across runs.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_report<W: Write>(
    writer: &mut W,
    result: &ScanResult,
    elapsed: Duration,
) -> io::Result<()> {
    for group in result.duplicate_groups() {
        writeln!(writer, "Duplicate files found for {}:", group.key())?;
        for path in group.sorted_paths() {
            writeln!(writer, "  {}", path.display())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "Zero length files:")?;
    let mut zero = result.zero_length_paths.clone();
    zero.sort();
    for path in &zero {
        writeln!(writer, "  {}", path.display())?;
    }

    writeln!(writer)?;
    writeln!(writer, "Oversize files:")?;
    let mut oversize = result.oversize_paths.clone();
    oversize.sort();
    for path in &oversize {
        writeln!(writer, "  {}", path.display())?;
    }

    writeln!(writer)?;
    writeln!(writer, "Done.")?;
    writeln!(writer, "Total run time: {elapsed:.2?}")?;
    Ok(())
}

/// Write the pre-count total announced before a scan starts.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_precount<W: Write>(writer: &mut W, total: usize) -> io::Result<()> {
    writeln!(writer, "Total number of files to scan: {total}")
}
