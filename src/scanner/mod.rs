//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deterministic directory walking using jwalk
//! - Streaming content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming, bounded memory)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{ScanOptions, Walker};
//! use std::path::Path;
//!
//! let options = ScanOptions {
//!     include_empty_files: false,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), options);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use hasher::{digest_to_hex, hex_to_digest, Digest, Hasher};
pub use walker::Walker;

/// Metadata for a discovered file, before its content has been hashed.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }
}

/// A fully hashed file as it appears in a scan result.
///
/// Created during a scan and immutable thereafter. A file either
/// contributes a complete digest or is excluded from the result
/// entirely; there is no partially hashed state.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// BLAKE3 digest of the full file content
    pub digest: Digest,
}

impl FileRecord {
    /// Combine a discovered entry with its computed digest.
    #[must_use]
    pub fn from_entry(entry: FileEntry, digest: Digest) -> Self {
        Self {
            path: entry.path,
            size: entry.size,
            modified: entry.modified,
            digest,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Follow symbolic links during traversal.
    /// Cycles introduced by links are detected and skipped.
    pub follow_symlinks: bool,

    /// Include zero-byte files in the scan.
    /// All empty files share the digest of the empty byte sequence,
    /// so they are legitimately reported as one duplicate group.
    pub include_empty_files: bool,

    /// Glob patterns to exclude (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_empty_files: true,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Errors that can occur during directory scanning.
///
/// All of these are per-item failures: the walker yields them inline
/// and continues, so one unreadable file or directory never aborts the
/// whole scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path disappeared between listing and opening.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A hashing failure for a discovered file.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (it may have vanished after listing).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Hashing was abandoned because a cooperative stop was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),
}
