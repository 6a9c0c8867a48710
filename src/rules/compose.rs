//! Combining an ordered rule list into one verdict per path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults::default_rules;
use super::verdict::{uniform, Verdict, VerdictMap};
use super::NamedRule;
use crate::duplicates::DuplicateSet;

/// Set-level safety overrides applied after the per-path maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionPolicy {
    /// Turn an all-DELETE result into all-UNKNOWN
    pub forbid_total_deletion: bool,
    /// Take no action on a set if any member is UNKNOWN
    pub require_certainty: bool,
}

impl Default for CompositionPolicy {
    fn default() -> Self {
        Self {
            forbid_total_deletion: true,
            require_certainty: true,
        }
    }
}

/// How the composed verdicts may be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Verdicts stand; DELETE members may be removed
    Decided,
    /// Every member came out DELETE, so all were reset to UNKNOWN
    TotalDeletionPrevented,
    /// Some member is UNKNOWN and certainty is required; nothing is removed
    Uncertain,
}

/// One rule's contribution to a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTrace {
    /// Rule label
    pub label: String,
    /// What the rule said about each member
    pub verdicts: VerdictMap,
}

/// Final verdicts for one duplicate set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// Composed verdict per member
    pub verdicts: VerdictMap,
    /// Whether the verdicts may be acted on
    pub outcome: Outcome,
    /// Per-rule breakdown, in rule order
    pub trace: Vec<RuleTrace>,
}

impl Decision {
    /// Composed verdict for `path`, UNKNOWN if it is not a member.
    #[must_use]
    pub fn verdict(&self, path: &Path) -> Verdict {
        self.verdicts.get(path).copied().unwrap_or_default()
    }

    /// Members marked KEEP.
    #[must_use]
    pub fn keeps(&self) -> Vec<&PathBuf> {
        self.with_verdict(Verdict::Keep)
    }

    /// Members that may be deleted. Empty unless the outcome is [`Outcome::Decided`].
    #[must_use]
    pub fn deletions(&self) -> Vec<&PathBuf> {
        if self.is_actionable() {
            self.with_verdict(Verdict::Delete)
        } else {
            Vec::new()
        }
    }

    /// True if DELETE verdicts may be acted on.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.outcome == Outcome::Decided
    }

    fn with_verdict(&self, wanted: Verdict) -> Vec<&PathBuf> {
        self.verdicts
            .iter()
            .filter(|(_, v)| **v == wanted)
            .map(|(p, _)| p)
            .collect()
    }
}

/// Evaluate every rule against `set` and combine the results.
///
/// Each rule sees the original set. The composed verdict for a path is the
/// maximum any rule gave it; paths a rule returns that are not members are
/// ignored. The policy overrides are then applied in order: total-deletion
/// first, then certainty.
#[must_use]
pub fn compose(rules: &[NamedRule], set: &DuplicateSet, policy: CompositionPolicy) -> Decision {
    let mut verdicts = uniform(set, Verdict::Unknown);
    let mut trace = Vec::with_capacity(rules.len());

    for named in rules {
        let out = named.rule.evaluate(set);
        for (path, verdict) in &out {
            if let Some(current) = verdicts.get_mut(path) {
                *current = (*current).max(*verdict);
            } else {
                log::debug!(
                    "Rule '{}' returned non-member {}",
                    named.label,
                    path.display()
                );
            }
        }
        trace.push(RuleTrace {
            label: named.label.clone(),
            verdicts: out,
        });
    }

    let mut outcome = Outcome::Decided;
    if policy.forbid_total_deletion
        && !verdicts.is_empty()
        && verdicts.values().all(|v| *v == Verdict::Delete)
    {
        log::debug!(
            "All {} members marked for deletion; resetting to unknown",
            verdicts.len()
        );
        verdicts = uniform(set, Verdict::Unknown);
        outcome = Outcome::TotalDeletionPrevented;
    }
    if outcome == Outcome::Decided
        && policy.require_certainty
        && verdicts.values().any(|v| *v == Verdict::Unknown)
    {
        outcome = Outcome::Uncertain;
    }

    Decision {
        verdicts,
        outcome,
        trace,
    }
}

/// An ordered rule list plus the policy it runs under.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<NamedRule>,
    policy: CompositionPolicy,
}

impl RuleEngine {
    /// Create an engine from an explicit rule list.
    #[must_use]
    pub fn new(rules: Vec<NamedRule>, policy: CompositionPolicy) -> Self {
        Self { rules, policy }
    }

    /// Create an engine starting from the protective default rules.
    #[must_use]
    pub fn with_defaults(policy: CompositionPolicy) -> Self {
        Self::new(default_rules(), policy)
    }

    /// Append a rule after the existing ones.
    pub fn push(&mut self, rule: NamedRule) {
        self.rules.push(rule);
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[NamedRule] {
        &self.rules
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> CompositionPolicy {
        self.policy
    }

    /// Decide one duplicate set.
    #[must_use]
    pub fn decide(&self, set: &DuplicateSet) -> Decision {
        compose(&self.rules, set, self.policy)
    }
}
