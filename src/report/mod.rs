//! Scan report artifact: building, serializing, and persisting.
//!
//! # Overview
//!
//! A [`ScanReport`] wraps a completed [`ScanResult`] together with a
//! classification tag and a creation timestamp, and serializes it into
//! a self-contained, human-inspectable JSON document:
//!
//! ```json
//! {
//!   "scan_info": { "directory": "...", "classification_tag": "sage", "timestamp": "..." },
//!   "duplicates": { "<digest>": [ {"path": "...", "size": 1, "modified": "..."}, ... ] },
//!   "summary": {
//!     "total_duplicate_groups": 1,
//!     "total_files_with_duplicates": 2,
//!     "wasted_space_bytes": 1,
//!     "skipped_files": 0
//!   }
//! }
//! ```
//!
//! Zero duplicate groups is a valid, successful report. Writing is
//! atomic: the document lands in a temp file next to its final
//! location and is renamed into place, so a report is either fully
//! written or not written at all.
//!
//! The classification tag is cosmetic metadata carried for the
//! operator; nothing in the scan pipeline branches on it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duplicates::{ScanResult, ScanSummary};

/// Closed set of report classification tags.
///
/// Carried verbatim into the report's `scan_info`; the default is
/// `sage`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationTag {
    /// Aggressive cleanup planning
    Warrior,
    /// Careful analysis
    #[default]
    Sage,
    /// Detailed investigation
    Detective,
    /// Quick overview
    Scout,
}

impl ClassificationTag {
    /// The tag as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Sage => "sage",
            Self::Detective => "detective",
            Self::Scout => "scout",
        }
    }
}

impl std::fmt::Display for ClassificationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file inside a duplicate group, as persisted in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    /// Absolute path to the file
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time, ISO-8601
    pub modified: String,
}

/// The `scan_info` block of the report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanInfo {
    /// Root directory that was scanned
    pub directory: String,
    /// Operator-chosen classification tag
    pub classification_tag: String,
    /// Report creation time, ISO-8601
    pub timestamp: String,
}

/// The `summary` block of the report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of digest groups with two or more members
    pub total_duplicate_groups: usize,
    /// Total files across duplicate groups, canonical members included
    pub total_files_with_duplicates: usize,
    /// Bytes occupied by non-canonical members of duplicate groups
    pub wasted_space_bytes: u64,
    /// Files excluded from the scan by per-item failures
    pub skipped_files: usize,
}

/// The complete persisted report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Scan metadata
    pub scan_info: ScanInfo,
    /// Duplicate groups keyed by digest hex; member order is the
    /// traversal order, so the first entry is the canonical copy
    pub duplicates: BTreeMap<String, Vec<ReportFile>>,
    /// Summary statistics
    pub summary: ReportSummary,
}

/// Errors that can occur while persisting a report.
///
/// These are fatal to the report write, but the caller still owns the
/// computed [`ScanResult`] and may retry.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// JSON serialization error
    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while writing the artifact
    #[error("Failed to write report to {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// A completed scan bundled with its report metadata.
///
/// Built once from a [`ScanResult`] and never mutated. The wrapped
/// result stays accessible so a failed write can be retried without
/// rescanning.
#[derive(Debug)]
pub struct ScanReport {
    /// The scan outcome this report describes
    pub result: ScanResult,
    /// Operator-chosen classification tag
    pub tag: ClassificationTag,
    /// Report creation time
    pub created_at: DateTime<Utc>,
    /// Files excluded from the scan by per-item failures
    pub skipped_files: usize,
}

impl ScanReport {
    /// Bundle a scan result with its report metadata, stamping the
    /// creation time.
    #[must_use]
    pub fn new(result: ScanResult, summary: &ScanSummary, tag: ClassificationTag) -> Self {
        Self {
            result,
            tag,
            created_at: Utc::now(),
            skipped_files: summary.skipped_files,
        }
    }

    /// Deterministic report file name:
    /// `duplicate_scan_<root-name>_<tag>.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let root_name = self
            .result
            .root
            .file_name()
            .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());
        format!("duplicate_scan_{}_{}.json", root_name, self.tag)
    }

    /// Build the serializable report document.
    ///
    /// Only duplicate groups are listed under `duplicates`; unique
    /// files stay out of the artifact. An empty map is a valid result.
    #[must_use]
    pub fn to_document(&self) -> ReportDocument {
        let duplicates: BTreeMap<String, Vec<ReportFile>> = self
            .result
            .duplicate_groups()
            .map(|group| {
                let files = group
                    .files
                    .iter()
                    .map(|f| ReportFile {
                        path: f.path.to_string_lossy().into_owned(),
                        size: f.size,
                        modified: DateTime::<Utc>::from(f.modified).to_rfc3339(),
                    })
                    .collect();
                (group.digest_hex(), files)
            })
            .collect();

        ReportDocument {
            scan_info: ScanInfo {
                directory: self.result.root.to_string_lossy().into_owned(),
                classification_tag: self.tag.to_string(),
                timestamp: self.created_at.to_rfc3339(),
            },
            duplicates,
            summary: ReportSummary {
                total_duplicate_groups: self.result.duplicate_group_count,
                total_files_with_duplicates: self.result.duplicated_file_count,
                wasted_space_bytes: self.result.wasted_bytes,
                skipped_files: self.skipped_files,
            },
        }
    }

    /// Serialize the report to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid
    /// data).
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Persist the report into the given output directory.
    ///
    /// The directory is created if missing. The document is written to
    /// a temp file alongside the final location and renamed into
    /// place, so an interrupted write never leaves a partial report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the directory cannot be created or
    /// the artifact cannot be written. The scan result is untouched
    /// and the write may be retried.
    pub fn write_to_dir(&self, output_dir: &Path) -> Result<PathBuf, ReportError> {
        let json = self.to_json()?;

        fs::create_dir_all(output_dir).map_err(|e| ReportError::Io {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        let final_path = output_dir.join(self.file_name());
        let tmp_path = output_dir.join(format!(".{}.tmp", self.file_name()));

        fs::write(&tmp_path, json).map_err(|e| ReportError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;

        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ReportError::Io {
                path: final_path,
                source: e,
            });
        }

        log::info!("Report saved: {}", final_path.display());
        Ok(final_path)
    }
}
