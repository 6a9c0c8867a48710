//! Hardlink-aware indexer collecting size-bucketed duplicate candidates.
//!
//! # Overview
//!
//! [`Indexer::add`] walks a root and accumulates three tables owned by the
//! indexer instance: the [`InodeTable`] of every path per physical object,
//! the [`SizeBuckets`] of representative regular files, and [`IndexStats`]
//! counters. It may be called once per root; state accumulates across calls,
//! so a file reachable from two roots is bucketed once.
//!
//! # Traversal
//!
//! Each visited path goes through, in order:
//! 1. `lstat`; unreadable or vanished paths are skipped and reported
//! 2. symlinks are skipped, or dereferenced with `stat` when following is on
//! 3. anything but a directory or regular file is skipped
//! 4. directories register their identity; an already-known identity is an
//!    alias and is not rescanned, otherwise children are queued in sorted
//!    order, minus entries whose basename is in the ignore set
//! 5. regular files are size-filtered, then either bucketed (first path of
//!    an identity) or recorded as a hardlink alias
//!
//! The walk uses an explicit stack rather than recursion, so tree depth is
//! bounded by heap, not by the call stack. Children are pushed in reverse so
//! they pop in sorted order, which keeps bucket order deterministic.
//!
//! Because a directory is registered before its children are queued, a
//! followed symlink that leads back to an ancestor resolves to a known
//! identity and is not descended into again.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::classify::{check_readable, classify};
use super::hardlink::{InodeTable, Observation};
use super::{FileKind, FileRecord, IndexerConfig, ScanError, SkipReason};
use crate::duplicates::SizeBuckets;
use crate::progress::{NullSink, ProgressSink, Throttle};

/// Counters accumulated over every `add` call.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Regular files placed into a size bucket
    pub included: usize,
    /// Bytes across included files
    pub included_bytes: u64,
    /// Distinct directories registered
    pub directories: usize,
    /// Paths recognised as another path's hardlink (files and directories)
    pub hardlink_aliases: usize,
    /// Skipped paths per reason
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl IndexStats {
    /// Number of paths skipped for `reason`.
    #[must_use]
    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    /// Number of paths skipped for any reason.
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Whether any path could not be read or stat'd.
    #[must_use]
    pub fn had_access_problems(&self) -> bool {
        self.skipped(SkipReason::AccessDenied) + self.skipped(SkipReason::StatFailed) > 0
    }

    fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }
}

/// Single-threaded, deterministic directory indexer.
pub struct Indexer {
    config: IndexerConfig,
    inodes: InodeTable,
    buckets: SizeBuckets,
    stats: IndexStats,
    sink: Box<dyn ProgressSink>,
    throttle: Throttle,
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Indexer {
    /// Create an indexer with a silent progress sink.
    ///
    /// # Example
    ///
    /// ```
    /// use dupekeep::scanner::{Indexer, IndexerConfig};
    ///
    /// let indexer = Indexer::new(IndexerConfig::default());
    /// assert!(indexer.buckets().is_empty());
    /// ```
    #[must_use]
    pub fn new(config: IndexerConfig) -> Self {
        Self {
            config,
            inodes: InodeTable::new(),
            buckets: SizeBuckets::new(),
            stats: IndexStats::default(),
            sink: Box::new(NullSink),
            throttle: Throttle::default(),
        }
    }

    /// Report skips, aliases and progress to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the status throttle (mainly for tests).
    #[must_use]
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// The configuration this indexer was built with.
    #[must_use]
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Representative regular files by size.
    #[must_use]
    pub fn buckets(&self) -> &SizeBuckets {
        &self.buckets
    }

    /// Every path seen per physical object.
    #[must_use]
    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Consume the indexer, returning its accumulated tables.
    #[must_use]
    pub fn into_parts(self) -> (SizeBuckets, InodeTable, IndexStats) {
        (self.buckets, self.inodes, self.stats)
    }

    /// Walk `root`, adding what it finds to the accumulated tables.
    ///
    /// With `recursive == false` only the root itself is considered: a file
    /// root is bucketed, a directory root is registered but not listed.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRoot`] only if `root` cannot be made
    /// absolute. Problems with individual paths are counted and reported
    /// to the sink, never returned.
    pub fn add(&mut self, root: &Path, recursive: bool) -> Result<(), ScanError> {
        let root = absolutize(root).map_err(|source| ScanError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;
        log::debug!("Indexing {} (recursive: {})", root.display(), recursive);

        let mut pending = vec![root];
        let mut descend = recursive;
        while let Some(path) = pending.pop() {
            self.visit(path, descend, &mut pending);
            // Only the root honours `recursive`; everything below it is walked fully.
            descend = true;
        }

        log::debug!(
            "Index now holds {} files in {} size buckets ({} skipped)",
            self.stats.included,
            self.buckets.len(),
            self.stats.total_skipped()
        );
        Ok(())
    }

    fn visit(&mut self, path: PathBuf, descend: bool, pending: &mut Vec<PathBuf>) {
        let record = match classify(&path, false) {
            Ok(record) => record,
            Err(e) => return self.skip_io(&path, &e),
        };

        let record = if record.kind == FileKind::Symlink {
            if !self.config.follow_symlinks {
                self.stats.record_skip(SkipReason::Symlink);
                self.diagnose(2, format!("  ignoring symlink   {}", path.display()));
                return;
            }
            self.diagnose(1, format!("  following symlink {}", path.display()));
            match classify(&path, true) {
                Ok(record) => record,
                Err(e) => return self.skip_io(&path, &e),
            }
        } else {
            record
        };

        match record.kind {
            FileKind::Directory => {
                self.report_status(&path);
                self.visit_directory(record, descend, pending);
            }
            FileKind::RegularFile => {
                self.report_status(&path);
                self.visit_file(record);
            }
            FileKind::Symlink | FileKind::Special => {
                self.stats.record_skip(SkipReason::UnsupportedKind);
                self.diagnose(1, format!("  ignoring special file ({})", path.display()));
            }
        }
    }

    fn visit_directory(&mut self, record: FileRecord, descend: bool, pending: &mut Vec<PathBuf>) {
        let listing = match fs::read_dir(&record.path) {
            Ok(listing) => listing,
            Err(e) => return self.skip_io(&record.path, &e),
        };

        if self.inodes.observe(record.identity, record.path.clone()) == Observation::Alias {
            self.stats.hardlink_aliases += 1;
            self.diagnose(
                1,
                format!(
                    "  ignoring duplicate hardlinks to directory (from {})",
                    record.path.display()
                ),
            );
            return;
        }
        self.stats.directories += 1;

        if !descend {
            return;
        }

        let mut children = Vec::new();
        for entry in listing {
            match entry {
                Ok(entry) => children.push(entry.file_name()),
                Err(e) => {
                    self.stats.record_skip(SkipReason::StatFailed);
                    self.sink.line(&format!(
                        "  could not list an entry of {}: {}",
                        record.path.display(),
                        e
                    ));
                }
            }
        }
        children.sort();

        let mut queued = Vec::with_capacity(children.len());
        for name in children {
            let child = record.path.join(&name);
            let ignored = name
                .to_str()
                .is_some_and(|n| self.config.ignore_dirnames.contains(n));
            if ignored {
                self.stats.record_skip(SkipReason::IgnoredDirname);
                self.diagnose(
                    2,
                    format!("  ignoring directory  {:?} by basename", child.display()),
                );
                continue;
            }
            queued.push(child);
        }
        pending.extend(queued.into_iter().rev());
    }

    fn visit_file(&mut self, record: FileRecord) {
        let FileRecord {
            path,
            identity,
            size,
            ..
        } = record;

        if let Err(e) = check_readable(&path) {
            return self.skip_io(&path, &e);
        }

        if size < self.config.min_size {
            self.stats.record_skip(SkipReason::TooSmall);
            let message = if size == 0 {
                format!("  ignoring empty file {:?}", path.display())
            } else {
                format!("  ignoring small file {:?}", path.display())
            };
            self.diagnose(3, message);
            return;
        }
        if self.config.max_size.is_some_and(|max| size > max) {
            self.stats.record_skip(SkipReason::TooLarge);
            self.diagnose(2, format!("  ignoring large file {:?}", path.display()));
            return;
        }

        match self.inodes.observe(identity, path.clone()) {
            Observation::Alias => {
                self.stats.hardlink_aliases += 1;
                self.diagnose(
                    1,
                    format!(
                        "  ignoring duplicate hardlinks to file (from {})",
                        path.display()
                    ),
                );
            }
            Observation::First => {
                self.stats.included += 1;
                self.stats.included_bytes += size;
                self.buckets.push(size, path);
            }
        }
    }

    /// Count and report a path that could not be read or stat'd.
    fn skip_io(&mut self, path: &Path, error: &io::Error) {
        let reason = match error.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound => SkipReason::AccessDenied,
            _ => SkipReason::StatFailed,
        };
        self.stats.record_skip(reason);
        log::debug!("Skipping {} ({}): {}", path.display(), reason, error);
        self.sink
            .line(&format!("  could not access {:?}: {}", path.display(), error));
    }

    /// Send a diagnostic line if verbosity allows it.
    fn diagnose(&self, min_verbosity: u8, message: String) {
        log::trace!("{}", message.trim_start());
        if self.config.verbosity >= min_verbosity {
            self.sink.line(&message);
        }
    }

    fn report_status(&mut self, path: &Path) {
        if self.config.verbosity >= 1 && self.throttle.ready() {
            self.sink.status(&format!(
                "{:6} included,  scanning for files... {}",
                self.stats.included,
                path.display()
            ));
        }
    }
}

/// Make a path absolute and fold `.` and `..` components lexically.
fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
