//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file in fixed-size chunks and folds them into a
//! streaming BLAKE3 state. A read error at any point abandons the attempt:
//! the caller gets a [`HashError`], never a partially computed digest.
//!
//! Chunk buffers are reused per thread, so memory held by a pool of `Q`
//! hashing workers is bounded by `Q` buffers regardless of how many files
//! pass through them.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Digester, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest(Path::new("some/file.bin")).unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;

/// Default chunk size for streaming reads (4 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;

thread_local! {
    static BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Something that turns a file path into a content digest.
///
/// The hashing scheduler only depends on this trait, so tests can inject
/// digesters that fail or that observe concurrency.
pub trait Digester: Send + Sync {
    /// Compute the content digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read to the end.
    fn digest(&self, path: &Path) -> Result<String, HashError>;
}

/// Streaming BLAKE3 hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 4 MiB chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the chunk size used for reads (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Chunk size used for reads.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash everything `reader` yields, using this thread's reusable buffer.
    ///
    /// # Errors
    ///
    /// Returns the first non-`Interrupted` read error.
    pub fn digest_reader<R: Read>(&self, reader: R) -> io::Result<String> {
        BUFFER.with(|cell| {
            let mut buf = cell.borrow_mut();
            if buf.len() < self.buffer_size {
                buf.resize(self.buffer_size, 0);
            }
            digest_with_buffer(reader, &mut buf[..self.buffer_size])
        })
    }
}

impl Digester for Hasher {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        // `file` is dropped on every exit path below, closing the descriptor.
        self.digest_reader(file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }
}

/// Fold `reader` into a BLAKE3 digest through `buf`.
///
/// # Errors
///
/// Any read error other than `Interrupted` aborts the digest.
pub fn digest_with_buffer<R: Read>(mut reader: R, buf: &mut [u8]) -> io::Result<String> {
    let mut state = blake3::Hasher::new();
    loop {
        match reader.read(buf) {
            Ok(0) => break,
            Ok(n) => {
                state.update(&buf[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(state.finalize().to_hex().to_string())
}
