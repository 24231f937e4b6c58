//! Duplicate detection: digest grouping and the scan pipeline.
//!
//! - [`groups`]: digest-keyed grouping of hashed files and the
//!   duplicate classification rules
//! - [`finder`]: the scan pipeline (walk, hash, group) with bounded
//!   parallel hashing
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (result, summary) = finder.scan(Path::new(".")).unwrap();
//!
//! println!(
//!     "{} duplicate groups, {} bytes wasted",
//!     result.duplicate_group_count, result.wasted_bytes
//! );
//! ```

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{duplicate_groups, group_by_digest, DigestGroup, ScanResult};
