//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting file metadata for duplicate detection. jwalk keeps
//! its pending directories in an explicit work queue rather than on the
//! call stack, so deeply nested trees cannot overflow, and children are
//! sorted per directory so the traversal order is stable within a run.
//! That order matters downstream: the first file of each digest group is
//! the canonical member against which wasted space is computed.
//!
//! # Error policy
//!
//! Per-item failures are yielded inline as [`ScanError`] values and the
//! walk continues. An unreadable directory skips its subtree; an
//! unreadable file skips that file. Nothing short of exhausting the tree
//! stops the iterator, except a cooperative stop request.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{ScanOptions, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), ScanOptions::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, ScanOptions};

/// Directory walker for ordered file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    options: ScanOptions,
    /// Optional stop flag for cooperative cancellation
    stop_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, options: ScanOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            options,
            stop_flag: None,
        }
    }

    /// Set the stop flag for cooperative cancellation.
    ///
    /// When the flag is set to `true`, the walker stops iteration as
    /// soon as possible.
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

    /// Build a gitignore matcher from the configured patterns.
    ///
    /// Only explicit patterns are honored; no `.gitignore` files are
    /// loaded from the tree, so an unconfigured walk sees every file.
    fn build_ignore_matcher(&self) -> Option<Gitignore> {
        if self.options.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.options.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(matcher) if !matcher.is_empty() => Some(matcher),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path matches the configured ignore patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, matcher: &Option<Gitignore>) -> bool {
        let Some(matcher) = matcher else {
            return false;
        };

        // Gitignore matching expects paths relative to the root, with
        // forward slashes even on Windows.
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        let normalized = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        matcher.matched(normalized, is_dir).is_ignore()
    }

    /// Walk the directory tree, yielding file entries in a stable order.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration. Two walks
    /// of an unchanged tree yield files in the same order.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let matcher = self.build_ignore_matcher();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.options.follow_symlinks)
            .skip_hidden(false)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Sort children for a stable, run-independent order
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_stop_requested() {
                log::debug!("Walker: stop requested, ending iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // Skip the root directory itself
                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return None;
                    }

                    if self.should_ignore(&path, false, &matcher) {
                        log::trace!("Ignoring file: {}", path.display());
                        return None;
                    }

                    if file_type.is_symlink() && !self.options.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    // Follow-mode resolves through the link target
                    let metadata = if self.options.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(classify_io_error(&path, e))),
                    };

                    // Skip anything that is not a regular file (sockets,
                    // fifos, link targets that are directories)
                    if !metadata.is_file() {
                        return None;
                    }

                    if metadata.len() == 0 && !self.options.include_empty_files {
                        log::trace!("Excluding empty file: {}", path.display());
                        return None;
                    }

                    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

                    Some(Ok(FileEntry::new(path, metadata.len(), modified)))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(classify_walk_error(path, &e)))
                }
            }
        })
    }
}

/// Map an I/O error during metadata access to a [`ScanError`].
fn classify_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::debug!("File vanished during walk: {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

/// Map a jwalk traversal error (e.g. an unreadable directory) to a
/// [`ScanError`].
fn classify_walk_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
    log::warn!("Walker error for {}: {}", path.display(), error);

    if let Some(io) = error.io_error() {
        if io.kind() == std::io::ErrorKind::PermissionDenied {
            return ScanError::PermissionDenied(path);
        }
    }

    ScanError::Io {
        path,
        source: std::io::Error::other(error.to_string()),
    }
}
