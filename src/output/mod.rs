//! Output formatters for duplicate scan results.
//!
//! This module provides two output formats for scan results:
//! - Plain text for the terminal
//! - JSON for automation and scripting
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
//! dupescan::output::text::write_report(&mut std::io::stdout(), &result, summary.scan_duration).unwrap();
//!
//! let output = JsonOutput::new(&result, &summary, None, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::{write_precount, write_report};
