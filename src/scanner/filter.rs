//! Eligibility rules for hashing.
//!
//! Rules are evaluated in a fixed order and the first one that applies wins:
//!
//! 1. Non-regular entries (symlinks, devices, sockets) are never eligible.
//! 2. Zero-length files are routed to the zero-length list.
//! 3. Files above the size ceiling are routed to the oversize list.
//! 4. With name patterns configured, the base name must match at least one.
//!
//! Everything here is pure: no I/O, no logging.

use std::path::Path;

use regex::Regex;

use super::FileEntry;

/// Outcome of classifying one walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Should be hashed.
    Eligible,
    /// Not a regular file.
    NotRegular,
    /// Size 0; recorded separately, never hashed.
    ZeroLength,
    /// Larger than the configured ceiling.
    Oversize,
    /// Base name matched none of the configured patterns.
    NameMismatch,
}

/// Compiled set of base-name patterns, OR-combined.
///
/// An empty set matches every name.
#[derive(Debug, Clone, Default)]
pub struct NamePatterns {
    patterns: Vec<Regex>,
}

impl NamePatterns {
    /// Compile a list of regular expressions.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Result<Self, regex::Error> {
        let patterns = sources
            .iter()
            .map(|s| Regex::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of configured patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether `name` matches at least one pattern (always true when empty).
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|re| re.is_match(name))
    }

    /// Match against the base name of `path`.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.matches(&name)
    }
}

/// Classify an entry from its path, size and kind.
///
/// `max_size` of `None` or `Some(0)` means unlimited.
#[must_use]
pub fn classify(
    path: &Path,
    size: u64,
    is_regular: bool,
    max_size: Option<u64>,
    patterns: &NamePatterns,
) -> Eligibility {
    if !is_regular {
        return Eligibility::NotRegular;
    }
    if size == 0 {
        return Eligibility::ZeroLength;
    }
    if let Some(ceiling) = max_size.filter(|&c| c > 0) {
        if size > ceiling {
            return Eligibility::Oversize;
        }
    }
    if !patterns.matches_path(path) {
        return Eligibility::NameMismatch;
    }
    Eligibility::Eligible
}

/// Whether an entry should be hashed.
#[must_use]
pub fn eligible(
    path: &Path,
    size: u64,
    is_regular: bool,
    max_size: Option<u64>,
    patterns: &NamePatterns,
) -> bool {
    classify(path, size, is_regular, max_size, patterns) == Eligibility::Eligible
}

/// Size ceiling plus name patterns, bundled for the scheduler.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    /// Maximum size in bytes; `None` means unlimited.
    pub max_size: Option<u64>,
    /// Base-name patterns.
    pub patterns: NamePatterns,
}

impl EligibilityFilter {
    /// Create a filter. A ceiling of `Some(0)` is normalised to unlimited.
    #[must_use]
    pub fn new(max_size: Option<u64>, patterns: NamePatterns) -> Self {
        Self {
            max_size: max_size.filter(|&c| c > 0),
            patterns,
        }
    }

    /// Classify a walked entry.
    #[must_use]
    pub fn classify(&self, entry: &FileEntry) -> Eligibility {
        classify(
            &entry.path,
            entry.size,
            entry.is_regular(),
            self.max_size,
            &self.patterns,
        )
    }
}
