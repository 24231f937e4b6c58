//! The scan pipeline: walk, hash, group.
//!
//! # Overview
//!
//! [`DuplicateFinder`] sequences the stages of a scan:
//! 1. **Walk** - collect every regular file under the root in a stable,
//!    pre-declared traversal order (see [`crate::scanner::Walker`])
//! 2. **Hash** - compute full-content BLAKE3 digests on a bounded rayon
//!    pool; results are merged back in the captured traversal order, so
//!    concurrency never changes which file is "first" in a group
//! 3. **Group** - partition by digest (see [`crate::duplicates::groups`])
//!
//! Per-file failures are recorded and skipped; only an invalid root or a
//! cooperative stop aborts the scan.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_max_concurrency(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let (result, summary) = finder.scan(Path::new("/some/path")).unwrap();
//!
//! println!("Scanned {} files", summary.total_files);
//! println!("Found {} duplicate groups", result.duplicate_group_count);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{
    Digest, FileEntry, FileRecord, HashError, Hasher, ScanError, ScanOptions, Walker,
};

use super::groups::{group_by_digest, ScanResult};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of concurrent hashing workers.
    /// Default is 4 to prevent disk thrashing.
    pub max_concurrency: usize,
    /// Walker configuration for directory traversal.
    pub scan_options: ScanOptions,
    /// Optional stop flag for cooperative cancellation.
    pub stop_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("scan_options", &self.scan_options)
            .field("stop_flag", &self.stop_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            scan_options: ScanOptions::default(),
            stop_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the maximum number of concurrent hashing workers.
    #[must_use]
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    /// Set the stop flag for cooperative cancellation.
    #[must_use]
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from one scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of regular files discovered by the walker
    pub total_files: usize,
    /// Number of files that contributed a digest
    pub hashed_files: usize,
    /// Number of items excluded by per-item failures
    pub skipped_files: usize,
    /// The per-item failures, in the order they were encountered
    pub scan_errors: Vec<ScanError>,
    /// Wall-clock duration of the whole scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Record a per-item failure and keep going.
    fn record_error(&mut self, error: ScanError) {
        log::warn!("Skipping item: {}", error);
        self.skipped_files += 1;
        self.scan_errors.push(error);
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided root path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan was interrupted by a cooperative stop request.
    #[error("Scan interrupted")]
    Interrupted,
}

/// Duplicate finder orchestrating the walk, hash, and group stages.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.stop_flag {
            hasher = hasher.with_stop_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan a directory tree for duplicate files.
    ///
    /// Walks the tree, hashes every discovered file, and groups files
    /// by digest. The walk order is captured before any hashing is
    /// dispatched and the parallel results are merged back in that
    /// order, so two scans of an unchanged tree produce identical
    /// groups regardless of concurrency.
    ///
    /// # Errors
    ///
    /// - [`FinderError::PathNotFound`] / [`FinderError::NotADirectory`]
    ///   if the root is invalid (checked before any traversal)
    /// - [`FinderError::Interrupted`] if a cooperative stop was
    ///   requested; in-flight hashes finish, unqueued work is discarded,
    ///   and no fabricated complete result is returned
    ///
    /// Per-file failures never abort the scan; they are recorded in the
    /// returned [`ScanSummary`].
    pub fn scan(&self, root: &Path) -> Result<(ScanResult, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_stop_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 1: walk and capture the traversal order
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walk", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.scan_options.clone());
        if let Some(ref flag) = self.config.stop_flag {
            walker = walker.with_stop_flag(flag.clone());
        }

        let mut entries: Vec<FileEntry> = Vec::new();
        for item in walker.walk() {
            match item {
                Ok(entry) => entries.push(entry),
                Err(e) => summary.record_error(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walk");
        }

        summary.total_files = entries.len();
        log::info!("Discovered {} files", summary.total_files);

        if self.config.is_stop_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 2: hash in parallel, merge back in traversal order
        let records = self.hash_entries(entries, &mut summary)?;
        summary.hashed_files = records.len();

        if self.config.is_stop_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 3: group by digest
        let result = ScanResult::new(root.to_path_buf(), group_by_digest(records));
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicated files, {} wasted, {} skipped",
            result.duplicate_group_count,
            result.duplicated_file_count,
            format_size(result.wasted_bytes),
            summary.skipped_files
        );

        Ok((result, summary))
    }

    /// Hash the captured entries on a bounded worker pool.
    ///
    /// The indexed parallel collect preserves input order, so the
    /// output records follow the traversal order even though hashing
    /// itself is concurrent. Each worker owns its own read buffer.
    fn hash_entries(
        &self,
        entries: Vec<FileEntry>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<FileRecord>, FinderError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hash", entries.len());
        }

        log::info!(
            "Hashing {} files on {} workers",
            entries.len(),
            self.config.max_concurrency
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrency)
            .build()
            .unwrap_or_else(|_| {
                log::warn!(
                    "Failed to create custom thread pool, using global pool with {} threads",
                    rayon::current_num_threads()
                );
                rayon::ThreadPoolBuilder::new().build().unwrap()
            });

        let hasher = self.hasher.clone();
        let callback = self.config.progress_callback.clone();

        let results: Vec<(FileEntry, Result<Digest, HashError>)> = pool.install(|| {
            entries
                .into_par_iter()
                .enumerate()
                .map(|(idx, entry)| {
                    if let Some(ref callback) = callback {
                        callback.on_progress(idx + 1, entry.path.to_string_lossy().as_ref());
                    }

                    let outcome = hasher.hash_file(&entry.path);
                    if outcome.is_ok() {
                        if let Some(ref callback) = callback {
                            callback.on_item_completed(entry.size);
                        }
                    }
                    (entry, outcome)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hash");
        }

        let mut interrupted = self.config.is_stop_requested();
        let mut records = Vec::with_capacity(results.len());

        for (entry, outcome) in results {
            match outcome {
                Ok(digest) => records.push(FileRecord::from_entry(entry, digest)),
                Err(HashError::Interrupted(_)) => interrupted = true,
                Err(e) => summary.record_error(ScanError::Hash(e)),
            }
        }

        if interrupted {
            log::info!("Hashing interrupted by stop request");
            return Err(FinderError::Interrupted);
        }

        Ok(records)
    }
}

/// Format a byte count as a human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
