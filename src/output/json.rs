//! JSON output for scan and decide results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "sets": [
//!     {
//!       "size": 1024,
//!       "outcome": "decided",
//!       "files": [
//!         { "path": "/data/a/b/x.bin", "verdict": "keep" },
//!         { "path": "/data/x.bin", "verdict": "delete" }
//!       ],
//!       "rules_fired": ["keep: deepest"]
//!     }
//!   ],
//!   "summary": {
//!     "included_files": 4,
//!     "duplicate_sets": 1,
//!     "decided": 1,
//!     "uncertain": 0,
//!     "total_deletion_prevented": 0,
//!     "marked_for_deletion": 1,
//!     "reclaimable_space": 1024,
//!     "exit_code": 0,
//!     "exit_code_name": "DK000"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::{Report, SetReport};
use crate::actions::BatchDeleteResult;
use crate::error::ExitCode;
use crate::rules::{Outcome, Verdict};
use crate::scanner::SkipReason;

/// One member of a set.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Composed verdict
    pub verdict: Verdict,
}

/// One decided set.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSet {
    /// Size of each member in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Whether the verdicts may be acted on
    pub outcome: Outcome,
    /// Members and their verdicts
    pub files: Vec<JsonFile>,
    /// Labels of rules that gave at least one non-UNKNOWN verdict
    pub rules_fired: Vec<String>,
}

impl JsonSet {
    fn from_set_report(set: &SetReport) -> Self {
        let decision = &set.decision;
        Self {
            size: set.size,
            outcome: decision.outcome,
            files: decision
                .verdicts
                .iter()
                .map(|(path, verdict)| JsonFile {
                    path: path.to_string_lossy().into_owned(),
                    verdict: *verdict,
                })
                .collect(),
            rules_fired: decision
                .trace
                .iter()
                .filter(|t| t.verdicts.values().any(|v| *v != Verdict::Unknown))
                .map(|t| t.label.clone())
                .collect(),
        }
    }
}

/// Summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files placed into size buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_files: Option<usize>,
    /// Hardlink aliases recognised while indexing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardlink_aliases: Option<usize>,
    /// Skipped paths per reason
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Size buckets with 2+ candidates
    pub candidate_groups: usize,
    /// Verified duplicate sets
    pub duplicate_sets: usize,
    /// Sets whose verdicts may be acted on
    pub decided: usize,
    /// Sets left alone because some member was undecided
    pub uncertain: usize,
    /// Sets where every member came out DELETE
    pub total_deletion_prevented: usize,
    /// Paths marked for deletion
    pub marked_for_deletion: usize,
    /// Bytes the deletions would free
    pub reclaimable_space: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DK000")
    pub exit_code_name: String,
}

impl JsonSummary {
    fn from_report(report: &Report, exit_code: ExitCode) -> Self {
        let stats = report.stats.as_ref();
        Self {
            included_files: stats.map(|s| s.included),
            hardlink_aliases: stats.map(|s| s.hardlink_aliases),
            skipped: stats.map(|s| s.skipped.clone()).unwrap_or_default(),
            candidate_groups: report.candidate_groups,
            duplicate_sets: report.sets.len(),
            decided: report.count(Outcome::Decided),
            uncertain: report.count(Outcome::Uncertain),
            total_deletion_prevented: report.count(Outcome::TotalDeletionPrevented),
            marked_for_deletion: report.deletion_count(),
            reclaimable_space: report.reclaimable(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Decided sets
    pub sets: Vec<JsonSet>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Deletion results, when deletions were carried out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<BatchDeleteResult>,
}

impl JsonOutput {
    /// Build the JSON view of a report.
    #[must_use]
    pub fn new(report: &Report, exit_code: ExitCode) -> Self {
        Self {
            sets: report.sets.iter().map(JsonSet::from_set_report).collect(),
            summary: JsonSummary::from_report(report, exit_code),
            deletion: report.deletion.clone(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (e.g. a non-UTF-8 path key).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
