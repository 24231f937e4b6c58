//! Digest-keyed grouping of hashed files.
//!
//! # Overview
//!
//! Once every file has a content digest, grouping is a pure,
//! I/O-free partition: files sharing a digest land in the same
//! [`DigestGroup`], in traversal order. A group with two or more
//! members is a duplicate group; its first member is the canonical
//! copy and every later member counts toward wasted space.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::group_by_digest;
//! use dupescan::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let records = vec![
//!     FileRecord { path: PathBuf::from("/a.txt"), size: 10, modified: SystemTime::now(), digest: [1u8; 32] },
//!     FileRecord { path: PathBuf::from("/b.txt"), size: 10, modified: SystemTime::now(), digest: [1u8; 32] },
//!     FileRecord { path: PathBuf::from("/c.txt"), size: 20, modified: SystemTime::now(), digest: [2u8; 32] },
//! ];
//!
//! let groups = group_by_digest(records);
//! assert_eq!(groups.len(), 2);
//! assert!(groups[0].is_duplicate());
//! assert_eq!(groups[0].wasted_bytes(), 10);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{digest_to_hex, Digest, FileRecord};

/// Files sharing one content digest, in traversal order.
#[derive(Debug, Clone)]
pub struct DigestGroup {
    /// BLAKE3 digest shared by every member
    pub digest: Digest,
    /// Member files; the first is the canonical copy
    pub files: Vec<FileRecord>,
}

impl DigestGroup {
    /// Create a group from a digest and its member files.
    #[must_use]
    pub fn new(digest: Digest, files: Vec<FileRecord>) -> Self {
        Self { digest, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// A group is a duplicate group iff it holds two or more files.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.files.len() >= 2
    }

    /// The first-encountered member, the baseline for wasted space.
    #[must_use]
    pub fn canonical(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Number of redundant copies (total minus the canonical member).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Bytes occupied by every member except the canonical one.
    #[must_use]
    pub fn wasted_bytes(&self) -> u64 {
        self.files.iter().skip(1).map(|f| f.size).sum()
    }

    /// Digest as a hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Group hashed files by digest, preserving traversal order.
///
/// Groups appear in the order their first member was encountered, and
/// files within a group keep their relative order. This makes the
/// "first member is canonical" rule deterministic for a given walk.
///
/// # Example
///
/// ```
/// use dupescan::duplicates::group_by_digest;
/// use dupescan::scanner::FileRecord;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let groups = group_by_digest(Vec::<FileRecord>::new());
/// assert!(groups.is_empty());
/// ```
#[must_use]
pub fn group_by_digest(records: impl IntoIterator<Item = FileRecord>) -> Vec<DigestGroup> {
    let mut groups: Vec<DigestGroup> = Vec::new();
    let mut index: HashMap<Digest, usize> = HashMap::new();

    for record in records {
        match index.get(&record.digest) {
            Some(&i) => groups[i].files.push(record),
            None => {
                index.insert(record.digest, groups.len());
                groups.push(DigestGroup::new(record.digest, vec![record]));
            }
        }
    }

    groups
}

/// Keep only duplicate groups (two or more members), preserving order.
///
/// Pure function over the grouping; no I/O and no failure modes.
#[must_use]
pub fn duplicate_groups(groups: Vec<DigestGroup>) -> Vec<DigestGroup> {
    groups.into_iter().filter(DigestGroup::is_duplicate).collect()
}

/// The immutable outcome of one scan.
///
/// Holds every digest group found under `root` plus the summary
/// statistics over the duplicate subset. Computed once when the scan
/// completes; owned by the caller until persisted or discarded.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Root directory the scan covered
    pub root: PathBuf,
    /// All digest groups, in traversal order of their first member
    pub groups: Vec<DigestGroup>,
    /// Number of groups with two or more members
    pub duplicate_group_count: usize,
    /// Total files across duplicate groups, canonical members included
    pub duplicated_file_count: usize,
    /// Bytes occupied by non-canonical members of duplicate groups
    pub wasted_bytes: u64,
}

impl ScanResult {
    /// Build a result from the grouped files, computing the summary
    /// statistics over the duplicate subset.
    #[must_use]
    pub fn new(root: PathBuf, groups: Vec<DigestGroup>) -> Self {
        let mut duplicate_group_count = 0;
        let mut duplicated_file_count = 0;
        let mut wasted_bytes = 0u64;

        for group in groups.iter().filter(|g| g.is_duplicate()) {
            duplicate_group_count += 1;
            duplicated_file_count += group.len();
            wasted_bytes += group.wasted_bytes();
        }

        Self {
            root,
            groups,
            duplicate_group_count,
            duplicated_file_count,
            wasted_bytes,
        }
    }

    /// Iterate over just the duplicate groups.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &DigestGroup> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn make_record(path: &str, size: u64, digest_byte: u8) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size,
            modified: SystemTime::now(),
            digest: [digest_byte; 32],
        }
    }

    #[test]
    fn test_group_by_digest_empty() {
        let groups = group_by_digest(Vec::<FileRecord>::new());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_group_by_digest_all_unique() {
        let records = vec![
            make_record("/a.txt", 100, 1),
            make_record("/b.txt", 200, 2),
            make_record("/c.txt", 300, 3),
        ];

        let groups = group_by_digest(records);

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| !g.is_duplicate()));
    }

    #[test]
    fn test_group_by_digest_merges_matches() {
        let records = vec![
            make_record("/a.txt", 100, 1),
            make_record("/b.txt", 200, 2),
            make_record("/c.txt", 100, 1),
        ];

        let groups = group_by_digest(records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].files[0].path, PathBuf::from("/a.txt"));
        assert_eq!(groups[0].files[1].path, PathBuf::from("/c.txt"));
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_group_order_follows_first_encounter() {
        let records = vec![
            make_record("/z.txt", 10, 9),
            make_record("/a.txt", 10, 1),
            make_record("/z2.txt", 10, 9),
        ];

        let groups = group_by_digest(records);

        assert_eq!(groups[0].digest, [9u8; 32]);
        assert_eq!(groups[1].digest, [1u8; 32]);
    }

    #[test]
    fn test_duplicate_groups_filter() {
        let records = vec![
            make_record("/a.txt", 100, 1),
            make_record("/b.txt", 100, 1),
            make_record("/c.txt", 300, 3),
        ];

        let groups = duplicate_groups(group_by_digest(records));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_wasted_bytes_excludes_canonical() {
        let group = DigestGroup::new(
            [1u8; 32],
            vec![
                make_record("/a.txt", 1000, 1),
                make_record("/b.txt", 1000, 1),
                make_record("/c.txt", 1000, 1),
            ],
        );

        assert_eq!(group.wasted_bytes(), 2000);
        assert_eq!(group.duplicate_count(), 2);
        assert_eq!(group.total_size(), 3000);
        assert_eq!(group.canonical().unwrap().path, PathBuf::from("/a.txt"));
    }

    #[test]
    fn test_wasted_bytes_single_member() {
        let group = DigestGroup::new([1u8; 32], vec![make_record("/a.txt", 1000, 1)]);

        assert_eq!(group.wasted_bytes(), 0);
        assert_eq!(group.duplicate_count(), 0);
        assert!(!group.is_duplicate());
    }

    #[test]
    fn test_wasted_bytes_zero_size_members() {
        let group = DigestGroup::new(
            [0u8; 32],
            vec![make_record("/empty1", 0, 0), make_record("/empty2", 0, 0)],
        );

        assert!(group.is_duplicate());
        assert_eq!(group.wasted_bytes(), 0);
    }

    #[test]
    fn test_scan_result_statistics() {
        let records = vec![
            make_record("/a.txt", 100, 1),
            make_record("/b.txt", 100, 1),
            make_record("/c.txt", 50, 2),
            make_record("/d.txt", 50, 2),
            make_record("/e.txt", 50, 2),
            make_record("/unique.txt", 999, 3),
        ];

        let result = ScanResult::new(PathBuf::from("/root"), group_by_digest(records));

        assert_eq!(result.duplicate_group_count, 2);
        assert_eq!(result.duplicated_file_count, 5);
        // 100 * (2-1) + 50 * (3-1)
        assert_eq!(result.wasted_bytes, 200);
        assert_eq!(result.duplicate_groups().count(), 2);
    }

    #[test]
    fn test_scan_result_empty() {
        let result = ScanResult::new(PathBuf::from("/root"), Vec::new());

        assert_eq!(result.duplicate_group_count, 0);
        assert_eq!(result.duplicated_file_count, 0);
        assert_eq!(result.wasted_bytes, 0);
    }

    #[test]
    fn test_wasted_bytes_law() {
        // wasted = size * (member_count - 1) for identical-size members
        let records = vec![
            make_record("/a", 7, 1),
            make_record("/b", 7, 1),
            make_record("/c", 7, 1),
            make_record("/d", 7, 1),
        ];

        let result = ScanResult::new(PathBuf::from("/root"), group_by_digest(records));

        assert_eq!(result.wasted_bytes, 7 * 3);
        assert_eq!(
            result.wasted_bytes,
            7 * (result.duplicated_file_count as u64 - result.duplicate_group_count as u64)
        );
    }

    #[test]
    fn test_digest_hex_length() {
        let group = DigestGroup::new([0xab; 32], Vec::new());
        let hex = group.digest_hex();

        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
