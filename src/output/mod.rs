//! Report rendering for scan and decide results.
//!
//! This module provides two output formats:
//! - Colored text for terminals ([`text`])
//! - JSON for automation and scripting ([`json`])
//!
//! Both render the same [`Report`].

pub mod json;
pub mod text;

use std::path::PathBuf;

use crate::actions::BatchDeleteResult;
use crate::rules::{Decision, Outcome};
use crate::scanner::IndexStats;

pub use json::JsonOutput;
pub use text::write_text;

/// One decided duplicate set.
#[derive(Debug, Clone)]
pub struct SetReport {
    /// Size of each member in bytes, when known
    pub size: Option<u64>,
    /// What the rule engine decided
    pub decision: Decision,
}

impl SetReport {
    /// Bytes freed if the set's deletions were carried out.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.size.unwrap_or(0) * self.decision.deletions().len() as u64
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Roots that were indexed (empty for `decide`)
    pub roots: Vec<PathBuf>,
    /// Indexer counters (absent for `decide`)
    pub stats: Option<IndexStats>,
    /// Size buckets holding 2+ candidates
    pub candidate_groups: usize,
    /// Decided sets, largest files first
    pub sets: Vec<SetReport>,
    /// Result of carrying out deletions, if requested
    pub deletion: Option<BatchDeleteResult>,
}

impl Report {
    /// Number of sets with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.sets
            .iter()
            .filter(|s| s.decision.outcome == outcome)
            .count()
    }

    /// Total bytes the decisions would free.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.sets.iter().map(SetReport::reclaimable).sum()
    }

    /// Number of paths marked for deletion across all actionable sets.
    #[must_use]
    pub fn deletion_count(&self) -> usize {
        self.sets.iter().map(|s| s.decision.deletions().len()).sum()
    }
}
