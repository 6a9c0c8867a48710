//! Rule engine deciding which members of a duplicate set to keep.
//!
//! This module provides functionality for:
//! - Rule primitives: path matching, depth, length, recency, random choice
//! - A protective default rule list
//! - Composition of an ordered rule list into one verdict per path
//!
//! # Architecture
//!
//! - [`verdict`]: [`Verdict`] and its total order `KEEP > DELETE > UNKNOWN`
//! - [`primitives`]: [`BuiltinRule`] and the pure functions behind it
//! - [`defaults`]: [`default_rules`]
//! - [`compose`]: [`compose`](compose::compose), [`CompositionPolicy`], [`Decision`]
//!
//! Rules are pure: each sees the original set, never another rule's output,
//! and never touches the filesystem beyond the `stat` calls of keep-newest.
//! Rules do not fail; a rule that cannot decide says [`Verdict::Unknown`].
//!
//! # Example
//!
//! ```
//! use dupekeep::duplicates::DuplicateSet;
//! use dupekeep::rules::{BuiltinRule, CompositionPolicy, NamedRule, RuleEngine, Verdict};
//!
//! let engine = RuleEngine::new(
//!     vec![NamedRule::new("keep longest path", BuiltinRule::keep_longest_path())],
//!     CompositionPolicy::default(),
//! );
//! let set = DuplicateSet::new(["/a/b/c.txt", "/a/bb/ccc.txt"]);
//! let decision = engine.decide(&set);
//!
//! assert_eq!(decision.verdict("/a/bb/ccc.txt".as_ref()), Verdict::Keep);
//! assert_eq!(decision.deletions().len(), 1);
//! ```

pub mod compose;
pub mod defaults;
pub mod primitives;
pub mod verdict;

use std::fmt;

use crate::duplicates::DuplicateSet;

pub use compose::{compose, CompositionPolicy, Decision, Outcome, RuleEngine, RuleTrace};
pub use defaults::default_rules;
pub use primitives::{BuiltinRule, PathPattern, Preference};
pub use verdict::{Verdict, VerdictMap};

/// A decision function over one duplicate set.
///
/// Implementations must return exactly one verdict for every member of the
/// input and must not mutate the filesystem. Any
/// `Fn(&DuplicateSet) -> VerdictMap` closure is a rule.
pub trait Rule {
    /// Judge every member of `set`.
    fn evaluate(&self, set: &DuplicateSet) -> VerdictMap;
}

impl<F> Rule for F
where
    F: Fn(&DuplicateSet) -> VerdictMap,
{
    fn evaluate(&self, set: &DuplicateSet) -> VerdictMap {
        self(set)
    }
}

/// A rule with a human-readable label, as used in rule lists and reports.
pub struct NamedRule {
    /// Label shown in decision traces
    pub label: String,
    /// The rule itself
    pub rule: Box<dyn Rule>,
}

impl NamedRule {
    /// Wrap a rule with a label.
    pub fn new(label: impl Into<String>, rule: impl Rule + 'static) -> Self {
        Self {
            label: label.into(),
            rule: Box::new(rule),
        }
    }
}

impl fmt::Debug for NamedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Errors raised while constructing rules.
#[derive(thiserror::Error, Debug)]
pub enum RuleError {
    /// A regular expression did not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// The regex compiler's complaint
        #[source]
        source: regex::Error,
    },
}
