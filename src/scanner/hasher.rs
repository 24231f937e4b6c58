//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents. Files are read in fixed-size chunks so memory use is
//! independent of file size, and a shared stop flag is checked between
//! chunks so one slow file cannot stall a cancelled scan past a single
//! chunk read.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{digest_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.hash_file(Path::new("Cargo.toml")).unwrap();
//! println!("{}", digest_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 256-bit BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Read buffer size for streaming hash computation.
const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming file hasher.
///
/// Stateless apart from an optional stop flag; one instance can be
/// shared across worker threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct Hasher {
    /// Optional stop flag checked between chunk reads
    stop_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self { stop_flag: None }
    }

    /// Set the stop flag for cooperative cancellation.
    ///
    /// When the flag becomes `true`, in-progress hashes return
    /// [`HashError::Interrupted`] at the next chunk boundary.
    #[must_use]
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the BLAKE3 digest of a file's full byte content.
    ///
    /// Reads in 64 KiB chunks; memory use does not grow with file
    /// size. A zero-byte file yields the digest of the empty
    /// byte sequence.
    ///
    /// # Errors
    ///
    /// - [`HashError::NotFound`] if the path vanished after listing
    /// - [`HashError::PermissionDenied`] if the file is unreadable
    /// - [`HashError::Io`] for any other read failure
    /// - [`HashError::Interrupted`] if a cooperative stop was requested
    pub fn hash_file(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| classify_io_error(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            if self.is_stop_requested() {
                log::debug!("Hashing interrupted: {}", path.display());
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let n = file.read(&mut buf).map_err(|e| classify_io_error(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Map an I/O error to the matching [`HashError`] variant.
fn classify_io_error(path: &Path, error: std::io::Error) -> HashError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Render a digest as a lowercase hexadecimal string (64 characters).
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a 64-character hexadecimal string back into a digest.
///
/// Returns `None` for strings of the wrong length or with non-hex
/// characters.
#[must_use]
pub fn hex_to_digest(hex: &str) -> Option<Digest> {
    if hex.len() != 64 {
        return None;
    }

    let mut digest = [0u8; 32];
    for (i, byte) in digest.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(digest)
}
