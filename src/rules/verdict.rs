//! Per-file verdicts and their total order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::duplicates::DuplicateSet;

/// Decision for one member of a duplicate set.
///
/// Variants are declared in ascending order, so the derived `Ord` gives
/// `Keep > Delete > Unknown`. Composition takes the maximum across rules:
/// protection beats deletion, and any opinion beats silence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No opinion
    #[default]
    Unknown,
    /// Candidate for removal
    Delete,
    /// Must be kept
    Keep,
}

impl Verdict {
    /// Short uppercase label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKN",
            Self::Delete => "DELE",
            Self::Keep => "KEEP",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "delete" | "dele" => Ok(Self::Delete),
            "unknown" | "unkn" => Ok(Self::Unknown),
            other => Err(format!("unknown verdict '{other}' (expected keep, delete or unknown)")),
        }
    }
}

/// One verdict per member path.
pub type VerdictMap = BTreeMap<PathBuf, Verdict>;

/// Give every member of `set` the same verdict.
#[must_use]
pub fn uniform(set: &DuplicateSet, verdict: Verdict) -> VerdictMap {
    set.iter().map(|p| (p.clone(), verdict)).collect()
}
