//! File actions module.
//!
//! This module provides canonical copy extraction: one representative per
//! duplicate group is copied to a destination directory together with a
//! manifest of the other members.
//!
//! ```no_run
//! use dupescan::actions::extract::{extract_group, prepare_destination};
//! # use dupescan::duplicates::DuplicateGroup;
//! # fn example(group: &DuplicateGroup) {
//! use std::path::Path;
//!
//! let dest = Path::new("/tmp/uniques");
//! prepare_destination(dest).unwrap();
//! let extracted = extract_group(group, dest).unwrap();
//! println!("{}", extracted.copy.display());
//! # }
//! ```

pub mod extract;

// Re-export commonly used types
pub use extract::{
    candidate_name, create_unique, extract_all, extract_group, prepare_destination,
    select_canonical, ExtractError, ExtractReport, ExtractedGroup, MANIFEST_SUFFIX,
};
