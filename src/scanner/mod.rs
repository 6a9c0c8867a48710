//! Scanner module for directory traversal and candidate collection.
//!
//! This module provides functionality for:
//! - Classifying paths (regular file, directory, symlink, special) without following links
//! - Hardlink-aware bookkeeping keyed by (device, inode)
//! - A deterministic, single-threaded indexer that buckets files by size
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`classify`]: stat wrappers producing [`FileRecord`] snapshots
//! - [`hardlink`]: the [`InodeTable`] of every path seen per identity
//! - [`indexer`]: the [`Indexer`] walk and its counters
//!
//! # Example
//!
//! ```no_run
//! use dupekeep::scanner::{Indexer, IndexerConfig};
//! use std::path::Path;
//!
//! let config = IndexerConfig {
//!     min_size: 1024, // Skip files under 1KB
//!     ..Default::default()
//! };
//!
//! let mut indexer = Indexer::new(config);
//! indexer.add(Path::new("."), true).unwrap();
//! for (size, paths) in indexer.buckets().candidates() {
//!     println!("{} bytes: {} candidates", size, paths.len());
//! }
//! ```

pub mod classify;
pub mod hardlink;
pub mod indexer;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use classify::{check_readable, classify};
pub use hardlink::{InodeTable, Observation};
pub use indexer::{IndexStats, Indexer};

/// Identity of one physical filesystem object: (device, inode).
///
/// Two paths with equal identity and equal kind refer to the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileIdentity {
    /// Device the object lives on
    pub device: u64,
    /// Inode number on that device
    pub inode: u64,
}

impl FileIdentity {
    /// Create a new identity.
    #[must_use]
    pub const fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.inode)
    }
}

/// Kind of filesystem object as reported by `lstat`/`stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A directory
    Directory,
    /// A regular file
    RegularFile,
    /// A symbolic link (only ever seen when not following links)
    Symlink,
    /// Device nodes, sockets, FIFOs and anything else
    Special,
}

/// Immutable stat snapshot of a path, taken when the indexer visits it.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path the snapshot was taken for
    pub path: PathBuf,
    /// (device, inode) of the object
    pub identity: FileIdentity,
    /// Object kind
    pub kind: FileKind,
    /// Size in bytes
    pub size: u64,
    /// Last access time
    pub accessed: SystemTime,
    /// Last content modification time
    pub modified: SystemTime,
    /// Last status change time
    pub changed: SystemTime,
}

impl FileRecord {
    /// The later of modification and status-change time.
    #[must_use]
    pub fn latest_change(&self) -> SystemTime {
        self.modified.max(self.changed)
    }
}

/// Configuration for the indexer.
///
/// Controls filtering, symlink handling, and diagnostic volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Minimum file size to include (in bytes). Defaults to 1, excluding empty files.
    pub min_size: u64,

    /// Maximum file size to include (in bytes), unbounded when `None`.
    pub max_size: Option<u64>,

    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Directory entry basenames never descended into (exact match).
    pub ignore_dirnames: BTreeSet<String>,

    /// Diagnostic volume for the progress sink (0 = silent except access failures).
    /// Never changes what gets indexed.
    pub verbosity: u8,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: None,
            follow_symlinks: false,
            ignore_dirnames: BTreeSet::new(),
            verbosity: 0,
        }
    }
}

impl IndexerConfig {
    /// Ignore directory entries with the given basenames.
    #[must_use]
    pub fn with_ignore_dirnames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_dirnames.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check if a file size passes the min/max filters.
    #[must_use]
    pub fn size_in_range(&self, size: u64) -> bool {
        size >= self.min_size && self.max_size.map_or(true, |max| size <= max)
    }
}

/// Why the indexer did not include a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Path could not be read (or a directory could not be listed)
    AccessDenied,
    /// Symlink while symlink following is disabled
    Symlink,
    /// Neither a directory nor a regular file
    UnsupportedKind,
    /// Below the configured minimum size
    TooSmall,
    /// Above the configured maximum size
    TooLarge,
    /// Directory entry whose basename is in the ignore set
    IgnoredDirname,
    /// Path vanished or could not be stat'd after the access check
    StatFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AccessDenied => "access denied",
            Self::Symlink => "symlink",
            Self::UnsupportedKind => "special file",
            Self::TooSmall => "too small",
            Self::TooLarge => "too large",
            Self::IgnoredDirname => "ignored directory name",
            Self::StatFailed => "stat failed",
        };
        f.write_str(s)
    }
}

/// Errors that can occur when starting a scan.
///
/// Problems with individual paths during the walk are never errors; they are
/// counted as [`SkipReason`]s and reported to the progress sink.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The root could not be resolved to an absolute path.
    #[error("cannot resolve root {path}: {source}")]
    InvalidRoot {
        /// Root as given by the caller
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
