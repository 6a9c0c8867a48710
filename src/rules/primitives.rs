//! Rule primitives.
//!
//! Each function here is total over its input set: it returns exactly one
//! verdict per member, and an empty set yields an empty map. [`BuiltinRule`]
//! bundles a primitive with its options, validated at construction.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::verdict::{uniform, Verdict, VerdictMap};
use super::{Rule, RuleError};
use crate::duplicates::DuplicateSet;
use crate::scanner::classify;

/// What a path-matching rule looks for.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Literal substring anywhere in the path
    Substring(String),
    /// Regular expression, unanchored search
    Regex(Regex),
}

impl PathPattern {
    /// Match a literal substring.
    pub fn substring(s: impl Into<String>) -> Self {
        Self::Substring(s.into())
    }

    /// Compile a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if the expression does not compile.
    pub fn regex(pattern: &str) -> Result<Self, RuleError> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|source| RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Check whether `path` matches.
    #[must_use]
    pub fn is_match(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        match self {
            Self::Substring(s) => text.contains(s.as_str()),
            Self::Regex(re) => re.is_match(&text),
        }
    }

    /// The pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Substring(s) => s,
            Self::Regex(re) => re.as_str(),
        }
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Substring(a), Self::Substring(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Mark matching paths KEEP and everything else UNKNOWN.
#[must_use]
pub fn keep_matching(set: &DuplicateSet, pattern: &PathPattern) -> VerdictMap {
    set.iter()
        .map(|p| {
            let v = if pattern.is_match(p) {
                Verdict::Keep
            } else {
                Verdict::Unknown
            };
            (p.clone(), v)
        })
        .collect()
}

/// Mark matching paths DELETE and everything else `others`.
#[must_use]
pub fn delete_matching(set: &DuplicateSet, pattern: &PathPattern, others: Verdict) -> VerdictMap {
    set.iter()
        .map(|p| {
            let v = if pattern.is_match(p) {
                Verdict::Delete
            } else {
                others
            };
            (p.clone(), v)
        })
        .collect()
}

/// Which end of a measure a rule prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    /// Largest value wins
    Max,
    /// Smallest value wins
    Min,
}

/// Number of components in the path's parent directory.
///
/// `/a/b/c.txt` has parent `/a/b`: root, `a`, `b` gives 3.
#[must_use]
pub fn directory_depth(path: &Path) -> usize {
    path.parent().map_or(0, |parent| parent.components().count())
}

/// Keep the member(s) at the deepest or shallowest directory level.
///
/// When every member sits at the same depth the rule has nothing to say and
/// returns UNKNOWN for all of them.
#[must_use]
pub fn keep_by_depth(set: &DuplicateSet, extreme: Extreme, others: Verdict) -> VerdictMap {
    let depths: Vec<usize> = set.iter().map(|p| directory_depth(p)).collect();
    let (Some(&min), Some(&max)) = (depths.iter().min(), depths.iter().max()) else {
        return VerdictMap::new();
    };
    if min == max {
        return uniform(set, Verdict::Unknown);
    }

    let target = match extreme {
        Extreme::Max => max,
        Extreme::Min => min,
    };
    set.iter()
        .zip(depths)
        .map(|(p, d)| (p.clone(), if d == target { Verdict::Keep } else { others }))
        .collect()
}

/// Keep every member whose `measure` is maximal; ties are all kept.
fn keep_maximal<F>(set: &DuplicateSet, others: Verdict, measure: F) -> VerdictMap
where
    F: Fn(&Path) -> usize,
{
    let values: Vec<usize> = set.iter().map(|p| measure(p)).collect();
    let Some(&best) = values.iter().max() else {
        return VerdictMap::new();
    };
    set.iter()
        .zip(values)
        .map(|(p, v)| (p.clone(), if v == best { Verdict::Keep } else { others }))
        .collect()
}

/// Keep the member(s) with the longest full path, in characters.
#[must_use]
pub fn keep_longest_path(set: &DuplicateSet, others: Verdict) -> VerdictMap {
    keep_maximal(set, others, |p| p.to_string_lossy().chars().count())
}

/// Keep the member(s) with the longest file name, in characters.
#[must_use]
pub fn keep_longest_basename(set: &DuplicateSet, others: Verdict) -> VerdictMap {
    keep_maximal(set, others, |p| {
        p.file_name()
            .map_or(0, |name| name.to_string_lossy().chars().count())
    })
}

/// Keep the member(s) most recently modified or changed.
///
/// Stats every member (following symlinks). If any stat fails the whole set
/// is UNKNOWN: judging only the members that could be read might keep an
/// older copy over a newer one.
#[must_use]
pub fn keep_newest(set: &DuplicateSet, others: Verdict) -> VerdictMap {
    let mut times = Vec::with_capacity(set.len());
    for path in set {
        match classify(path, true) {
            Ok(record) => times.push(record.latest_change()),
            Err(e) => {
                log::warn!(
                    "Not deciding set - could not stat {}: {}",
                    path.display(),
                    e
                );
                return uniform(set, Verdict::Unknown);
            }
        }
    }

    let Some(&newest) = times.iter().max() else {
        return VerdictMap::new();
    };
    set.iter()
        .zip(times)
        .map(|(p, t)| (p.clone(), if t == newest { Verdict::Keep } else { others }))
        .collect()
}

/// Keep one uniformly random member and delete the rest.
///
/// Only for sets where the caller truly does not care which copy survives.
#[must_use]
pub fn choose_one_random<R: Rng + ?Sized>(set: &DuplicateSet, rng: &mut R) -> VerdictMap {
    let Some(chosen) = set.paths().choose(rng) else {
        return VerdictMap::new();
    };
    set.iter()
        .map(|p| {
            let v = if p == chosen {
                Verdict::Keep
            } else {
                Verdict::Delete
            };
            (p.clone(), v)
        })
        .collect()
}

/// A built-in rule together with its options.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinRule {
    /// Matching paths KEEP, others UNKNOWN
    KeepMatching(PathPattern),
    /// Matching paths DELETE, others `others`
    DeleteMatching {
        /// What to delete
        pattern: PathPattern,
        /// Verdict for paths that do not match
        others: Verdict,
    },
    /// Deepest directory level KEEP
    KeepDeepest {
        /// Verdict for the rest
        others: Verdict,
    },
    /// Shallowest directory level KEEP
    KeepShallowest {
        /// Verdict for the rest
        others: Verdict,
    },
    /// Longest full path KEEP
    KeepLongestPath {
        /// Verdict for the rest
        others: Verdict,
    },
    /// Longest file name KEEP
    KeepLongestBasename {
        /// Verdict for the rest
        others: Verdict,
    },
    /// Latest of mtime/ctime KEEP
    KeepNewest {
        /// Verdict for the rest
        others: Verdict,
    },
    /// One random member KEEP, the rest DELETE
    RandomChoice {
        /// Fixed seed for reproducible choices
        seed: Option<u64>,
    },
}

impl BuiltinRule {
    /// Keep paths matching a regex.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for a bad regex.
    pub fn keep_regex(pattern: &str) -> Result<Self, RuleError> {
        PathPattern::regex(pattern).map(Self::KeepMatching)
    }

    /// Keep paths containing a substring.
    pub fn keep_substring(s: impl Into<String>) -> Self {
        Self::KeepMatching(PathPattern::substring(s))
    }

    /// Delete paths matching a regex; everything else is KEEP.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for a bad regex.
    pub fn delete_regex(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self::DeleteMatching {
            pattern: PathPattern::regex(pattern)?,
            others: Verdict::Keep,
        })
    }

    /// Delete paths containing a substring; everything else is KEEP.
    pub fn delete_substring(s: impl Into<String>) -> Self {
        Self::DeleteMatching {
            pattern: PathPattern::substring(s),
            others: Verdict::Keep,
        }
    }

    /// Keep the deepest member(s), delete the rest.
    #[must_use]
    pub fn keep_deepest() -> Self {
        Self::KeepDeepest {
            others: Verdict::Delete,
        }
    }

    /// Keep the shallowest member(s), delete the rest.
    #[must_use]
    pub fn keep_shallowest() -> Self {
        Self::KeepShallowest {
            others: Verdict::Delete,
        }
    }

    /// Keep the member(s) with the longest path, delete the rest.
    #[must_use]
    pub fn keep_longest_path() -> Self {
        Self::KeepLongestPath {
            others: Verdict::Delete,
        }
    }

    /// Keep the member(s) with the longest file name, delete the rest.
    #[must_use]
    pub fn keep_longest_basename() -> Self {
        Self::KeepLongestBasename {
            others: Verdict::Delete,
        }
    }

    /// Keep the newest member(s), delete the rest.
    #[must_use]
    pub fn keep_newest() -> Self {
        Self::KeepNewest {
            others: Verdict::Delete,
        }
    }

    /// Keep one random member.
    #[must_use]
    pub fn random_choice() -> Self {
        Self::RandomChoice { seed: None }
    }

    /// Short description used as a default label.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::KeepMatching(p) => format!("keep: {}", p.as_str()),
            Self::DeleteMatching { pattern, .. } => format!("delete: {}", pattern.as_str()),
            Self::KeepDeepest { .. } => "keep: deepest".to_string(),
            Self::KeepShallowest { .. } => "keep: shallowest".to_string(),
            Self::KeepLongestPath { .. } => "keep: longest path".to_string(),
            Self::KeepLongestBasename { .. } => "keep: longest name".to_string(),
            Self::KeepNewest { .. } => "keep: newest".to_string(),
            Self::RandomChoice { .. } => "keep: random one".to_string(),
        }
    }
}

impl Rule for BuiltinRule {
    fn evaluate(&self, set: &DuplicateSet) -> VerdictMap {
        match self {
            Self::KeepMatching(pattern) => keep_matching(set, pattern),
            Self::DeleteMatching { pattern, others } => delete_matching(set, pattern, *others),
            Self::KeepDeepest { others } => keep_by_depth(set, Extreme::Max, *others),
            Self::KeepShallowest { others } => keep_by_depth(set, Extreme::Min, *others),
            Self::KeepLongestPath { others } => keep_longest_path(set, *others),
            Self::KeepLongestBasename { others } => keep_longest_basename(set, *others),
            Self::KeepNewest { others } => keep_newest(set, *others),
            Self::RandomChoice { seed: Some(seed) } => {
                choose_one_random(set, &mut StdRng::seed_from_u64(*seed))
            }
            Self::RandomChoice { seed: None } => choose_one_random(set, &mut rand::thread_rng()),
        }
    }
}

/// Tie-breaking strategies selectable from the CLI and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    /// Keep the copy in the deepest directory
    Deepest,
    /// Keep the copy in the shallowest directory
    Shallowest,
    /// Keep the copy with the longest path
    LongestPath,
    /// Keep the copy with the longest file name
    LongestName,
    /// Keep the most recently modified copy
    Newest,
    /// Keep a random copy (only if you really don't care)
    Random,
}

impl Preference {
    /// The rule implementing this preference.
    #[must_use]
    pub fn rule(self) -> BuiltinRule {
        match self {
            Self::Deepest => BuiltinRule::keep_deepest(),
            Self::Shallowest => BuiltinRule::keep_shallowest(),
            Self::LongestPath => BuiltinRule::keep_longest_path(),
            Self::LongestName => BuiltinRule::keep_longest_basename(),
            Self::Newest => BuiltinRule::keep_newest(),
            Self::Random => BuiltinRule::random_choice(),
        }
    }
}
