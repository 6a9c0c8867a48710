//! Carrying out the deletions a [`Decision`] allows.
//!
//! A [`DeletionPlan`] is the only way to remove files. Building one checks
//! that the decision is actionable, that every target belongs to the set and
//! that at least one member survives. Each target's size and mtime are
//! recorded so a file that changed after planning is left alone.
//!
//! Files go to the system trash unless [`Disposal::Permanent`] is asked for.
//!
//! ```no_run
//! use dupekeep::actions::delete::{DeleteConfig, DeletionPlan};
//! use dupekeep::duplicates::DuplicateSet;
//! use dupekeep::rules::{BuiltinRule, CompositionPolicy, NamedRule, RuleEngine};
//!
//! let set = DuplicateSet::new(["/data/a/report.pdf", "/data/report.pdf"]);
//! let engine = RuleEngine::new(
//!     vec![NamedRule::new("keep deepest", BuiltinRule::keep_deepest())],
//!     CompositionPolicy::default(),
//! );
//!
//! let plan = DeletionPlan::from_decision(&set, &engine.decide(&set))?;
//! println!("{}", plan.execute(&DeleteConfig::trash()).summary());
//! # Ok::<(), dupekeep::actions::delete::DeleteError>(())
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytesize::ByteSize;
use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateSet;
use crate::rules::Decision;

/// Why a plan could not be built or a target was not removed.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("file no longer exists: {0}")]
    Vanished(PathBuf),

    #[error("permission denied: {0}")]
    Denied(PathBuf),

    /// Size or mtime differs from what the plan recorded.
    #[error("file modified since scan: {0}")]
    Changed(PathBuf),

    #[error("{verb} failed for {path}: {message}")]
    Disposal {
        path: PathBuf,
        verb: &'static str,
        message: String,
    },

    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// Every survivor disappeared between planning and execution.
    #[error("no surviving copy of {0} remains on disk")]
    NoSurvivor(PathBuf),

    #[error("not a member of the duplicate set: {0}")]
    NotAMember(PathBuf),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// The file this error is about, if it names one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Vanished(p)
            | Self::Denied(p)
            | Self::Changed(p)
            | Self::NoSurvivor(p)
            | Self::NotAMember(p)
            | Self::Disposal { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn stat(path: &Path, e: io::Error) -> Self {
        let path = path.to_path_buf();
        match e.kind() {
            io::ErrorKind::NotFound => Self::Vanished(path),
            io::ErrorKind::PermissionDenied => Self::Denied(path),
            _ => Self::Io { path, source: e },
        }
    }
}

/// Where a deleted file ends up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposal {
    /// Platform trash, recoverable.
    #[default]
    Trash,
    /// `unlink`; cannot be undone.
    Permanent,
}

impl Disposal {
    fn verb(self) -> &'static str {
        match self {
            Self::Trash => "move to trash",
            Self::Permanent => "permanent delete",
        }
    }

    fn apply(self, path: &Path) -> Result<(), DeleteError> {
        let outcome = match self {
            Self::Trash => trash::delete(path).map_err(|e| e.to_string()),
            Self::Permanent => fs::remove_file(path).map_err(|e| e.to_string()),
        };
        outcome.map_err(|message| {
            log::error!("Could not {} {}: {}", self.verb(), path.display(), message);
            DeleteError::Disposal {
                path: path.to_path_buf(),
                verb: self.verb(),
                message,
            }
        })
    }
}

/// How a plan is executed.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    pub disposal: Disposal,
    /// Skip targets whose size or mtime changed since planning.
    pub check_unchanged: bool,
    /// Keep going after a target fails.
    pub continue_on_error: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            disposal: Disposal::Trash,
            check_unchanged: true,
            continue_on_error: true,
        }
    }
}

impl DeleteConfig {
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permanent() -> Self {
        Self {
            disposal: Disposal::Permanent,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_change_check(mut self, check: bool) -> Self {
        self.check_unchanged = check;
        self
    }

    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// A file the plan removed.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedFile {
    pub path: PathBuf,
    pub size: u64,
    pub disposal: Disposal,
}

/// What happened when one or more plans were executed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteResult {
    pub deleted: Vec<DeletedFile>,
    /// Targets left in place, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: BatchDeleteResult) {
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
        self.bytes_freed += other.bytes_freed;
    }

    fn record(&mut self, file: DeletedFile) {
        self.bytes_freed += file.size;
        self.deleted.push(file);
    }

    fn fail(&mut self, path: &Path, error: &DeleteError) {
        self.failures.push((path.to_path_buf(), error.to_string()));
    }

    /// One-line account for the end of a run.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize(self.bytes_freed);
        match self.failure_count() {
            0 => format!("Deleted {} file(s), freed {}", self.success_count(), freed),
            n => format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                n,
                freed
            ),
        }
    }
}

/// A path to delete and its state when the plan was built.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: PathBuf,
    size: u64,
    mtime: Option<SystemTime>,
}

impl Target {
    fn stat(path: &Path) -> Result<Self, DeleteError> {
        let meta = fs::metadata(path).map_err(|e| DeleteError::stat(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            size: meta.len(),
            mtime: meta.modified().ok(),
        })
    }

    fn ensure_unchanged(&self) -> Result<(), DeleteError> {
        let now = Self::stat(&self.path)?;
        let mtime_moved = matches!((self.mtime, now.mtime), (Some(a), Some(b)) if a != b);
        if mtime_moved || now.size != self.size {
            log::warn!(
                "Skipping {}: modified since scan ({} -> {} bytes)",
                self.path.display(),
                self.size,
                now.size
            );
            return Err(DeleteError::Changed(self.path.clone()));
        }
        Ok(())
    }

    fn remove(&self, config: &DeleteConfig) -> Result<DeletedFile, DeleteError> {
        if config.check_unchanged {
            self.ensure_unchanged()?;
        }
        config.disposal.apply(&self.path)?;
        log::info!(
            "Removed ({:?}): {} ({})",
            config.disposal,
            self.path.display(),
            ByteSize(self.size)
        );
        Ok(DeletedFile {
            path: self.path.clone(),
            size: self.size,
            disposal: config.disposal,
        })
    }
}

/// The deletions one decision allows, checked and ready to execute.
#[derive(Debug, Clone, Default)]
pub struct DeletionPlan {
    survivors: Vec<PathBuf>,
    targets: Vec<Target>,
}

impl DeletionPlan {
    /// Build a plan from a decision over `set`.
    ///
    /// A decision that is not actionable yields an empty plan. An all-delete
    /// plan is always refused, whatever policy produced the decision.
    ///
    /// # Errors
    ///
    /// - `NotAMember` if the decision marks a path outside `set`
    /// - `AllCopiesWouldBeDeleted` if nothing would survive
    /// - `Vanished` / `Denied` / `Io` if a target can't be stat'd
    pub fn from_decision(set: &DuplicateSet, decision: &Decision) -> Result<Self, DeleteError> {
        let doomed: BTreeSet<&PathBuf> = decision.deletions().into_iter().collect();
        if doomed.is_empty() {
            return Ok(Self::default());
        }
        if let Some(stray) = doomed.iter().find(|p| !set.contains(p)) {
            return Err(DeleteError::NotAMember(stray.to_path_buf()));
        }

        let survivors: Vec<PathBuf> = set
            .iter()
            .filter(|p| !doomed.contains(p))
            .cloned()
            .collect();
        if survivors.is_empty() {
            log::error!("Refusing to delete all {} copies of a duplicate set", set.len());
            return Err(DeleteError::AllCopiesWouldBeDeleted);
        }

        let targets = doomed
            .into_iter()
            .map(|p| Target::stat(p))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Planned {} deletion(s), {} survivor(s)",
            targets.len(),
            survivors.len()
        );
        Ok(Self { survivors, targets })
    }

    /// Paths this plan leaves in place.
    #[must_use]
    pub fn survivors(&self) -> &[PathBuf] {
        &self.survivors
    }

    /// Paths this plan removes, in sorted order.
    pub fn targets(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().map(|t| t.path.as_path())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Bytes the plan would free.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.targets.iter().map(|t| t.size).sum()
    }

    /// Delete every target.
    ///
    /// Nothing is removed unless at least one survivor still exists. With
    /// `check_unchanged`, a target that changed since planning is skipped.
    #[must_use]
    pub fn execute(&self, config: &DeleteConfig) -> BatchDeleteResult {
        let mut result = BatchDeleteResult::default();
        let Some(first) = self.targets.first() else {
            return result;
        };

        if !self.survivors.iter().any(|p| p.exists()) {
            let err = DeleteError::NoSurvivor(first.path.clone());
            log::error!("{}; refusing to delete", err);
            for target in &self.targets {
                result.fail(&target.path, &err);
            }
            return result;
        }

        for target in &self.targets {
            match target.remove(config) {
                Ok(file) => result.record(file),
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", target.path.display(), e);
                    result.fail(&target.path, &e);
                    if !config.continue_on_error {
                        log::info!("Stopping after first failure");
                        break;
                    }
                }
            }
        }

        log::info!("{}", result.summary());
        result
    }
}
