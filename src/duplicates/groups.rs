//! Size buckets and duplicate sets.
//!
//! # Overview
//!
//! [`SizeBuckets`] is the indexer's principal output: for every file size,
//! the representative paths (one per physical file) of that size, in the
//! order the walk reached them. Files with different sizes cannot be
//! duplicates, so only buckets with 2+ paths are worth verifying.
//!
//! [`DuplicateSet`] is what a content verifier hands back: paths asserted to
//! have identical content. The rule engine works on one set at a time.
//!
//! # Example
//!
//! ```
//! use dupekeep::duplicates::SizeBuckets;
//! use std::path::PathBuf;
//!
//! let mut buckets = SizeBuckets::new();
//! buckets.push(1024, PathBuf::from("/file1.txt"));
//! buckets.push(1024, PathBuf::from("/file2.txt"));
//! buckets.push(2048, PathBuf::from("/file3.txt"));
//!
//! assert_eq!(buckets.file_count(), 3);
//! assert_eq!(buckets.candidates().count(), 1);
//! ```

use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Representative paths grouped by exact file size.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeBuckets {
    buckets: BTreeMap<u64, Vec<PathBuf>>,
}

impl SizeBuckets {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path to the bucket for `size`, creating the bucket if absent.
    pub fn push(&mut self, size: u64, path: PathBuf) {
        self.buckets.entry(size).or_default().push(path);
    }

    /// Paths of exactly `size` bytes, in insertion order.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&[PathBuf]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Iterate all buckets, smallest size first.
    pub fn iter(&self) -> btree_map::Iter<'_, u64, Vec<PathBuf>> {
        self.buckets.iter()
    }

    /// Buckets with two or more paths, largest size first.
    ///
    /// Largest first so the biggest potential savings are verified early.
    pub fn candidates(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.buckets
            .iter()
            .rev()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(size, paths)| (*size, paths.as_slice()))
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file was bucketed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of bucketed paths.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Total bytes across all bucketed paths.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.buckets
            .iter()
            .map(|(size, paths)| size * paths.len() as u64)
            .sum()
    }

    /// Bytes that could be reclaimed if every candidate bucket turned out to
    /// be one duplicate set (all copies minus one).
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.candidates()
            .map(|(size, paths)| size * (paths.len() as u64 - 1))
            .sum()
    }
}

impl<'a> IntoIterator for &'a SizeBuckets {
    type Item = (&'a u64, &'a Vec<PathBuf>);
    type IntoIter = btree_map::Iter<'a, u64, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// A set of paths verified to have identical content.
///
/// Paths are kept in first-seen order; repeated paths are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateSet {
    paths: Vec<PathBuf>,
}

impl DuplicateSet {
    /// Build a set from paths, dropping repeats.
    #[must_use]
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &PathBuf| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }

    /// Member paths in first-seen order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Check whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over member paths.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

impl<'a> IntoIterator for &'a DuplicateSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
