//! Hardlink bookkeeping for avoiding double counting.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on disk.
//! They share the same content but are NOT duplicates - they're the same file,
//! and deleting "one copy" of a hardlink pair frees nothing.
//!
//! [`InodeTable`] remembers every path observed for each [`FileIdentity`], in
//! first-seen order. The first path is the representative used for size
//! bucketing; later paths are aliases, retained for diagnostics.
//!
//! # Example
//!
//! ```
//! use dupekeep::scanner::{FileIdentity, InodeTable, Observation};
//! use std::path::PathBuf;
//!
//! let mut table = InodeTable::new();
//! let id = FileIdentity::new(1, 42);
//!
//! assert_eq!(table.observe(id, PathBuf::from("/a/x.bin")), Observation::First);
//! assert_eq!(table.observe(id, PathBuf::from("/a/x-link.bin")), Observation::Alias);
//! assert_eq!(table.aliases(id).unwrap().len(), 2);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::FileIdentity;

/// Result of recording a path against its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First path seen for this identity; it becomes the representative.
    First,
    /// The identity was already known; the path was appended as an alias.
    Alias,
}

/// Maps each seen identity to every path that referenced it.
///
/// Grows monotonically during a walk and never shrinks.
///
/// # Thread Safety
///
/// `InodeTable` is owned by a single [`Indexer`](super::Indexer) run and is not
/// shared across threads.
#[derive(Debug, Default, Clone)]
pub struct InodeTable {
    groups: HashMap<FileIdentity, Vec<PathBuf>>,
}

impl InodeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// Create a table with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            groups: HashMap::with_capacity(capacity),
        }
    }

    /// Record `path` for `identity`.
    ///
    /// Returns [`Observation::First`] when the identity is new, otherwise
    /// appends the path as an alias and returns [`Observation::Alias`].
    pub fn observe(&mut self, identity: FileIdentity, path: PathBuf) -> Observation {
        match self.groups.get_mut(&identity) {
            Some(paths) => {
                paths.push(path);
                Observation::Alias
            }
            None => {
                self.groups.insert(identity, vec![path]);
                Observation::First
            }
        }
    }

    /// Check whether an identity has been seen, without recording anything.
    #[must_use]
    pub fn contains(&self, identity: FileIdentity) -> bool {
        self.groups.contains_key(&identity)
    }

    /// All paths seen for `identity`, representative first.
    #[must_use]
    pub fn aliases(&self, identity: FileIdentity) -> Option<&[PathBuf]> {
        self.groups.get(&identity).map(Vec::as_slice)
    }

    /// The representative (first-seen) path for `identity`.
    #[must_use]
    pub fn representative(&self, identity: FileIdentity) -> Option<&Path> {
        self.groups
            .get(&identity)
            .and_then(|paths| paths.first())
            .map(PathBuf::as_path)
    }

    /// Identities reached through two or more paths, ordered by identity.
    #[must_use]
    pub fn hardlinked_groups(&self) -> Vec<(FileIdentity, &[PathBuf])> {
        let mut groups: Vec<_> = self
            .groups
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(id, paths)| (*id, paths.as_slice()))
            .collect();
        groups.sort_by_key(|(id, _)| *id);
        groups
    }

    /// Number of distinct identities tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
