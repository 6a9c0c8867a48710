//! Human-readable report.
//!
//! Colors come from `yansi`; call `yansi::disable()` beforehand for plain
//! output.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::{Report, SetReport};
use crate::rules::{Outcome, Verdict};

/// Write the report as text.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_text<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    for (index, set) in report.sets.iter().enumerate() {
        write_set(w, index + 1, set)?;
    }
    write_summary(w, report)
}

fn write_set<W: Write>(w: &mut W, number: usize, set: &SetReport) -> io::Result<()> {
    let decision = &set.decision;
    let size = set
        .size
        .map(|s| format!(", {} each", ByteSize(s)))
        .unwrap_or_default();
    let outcome = match decision.outcome {
        Outcome::Decided => "decided".green().to_string(),
        Outcome::Uncertain => "uncertain, left alone".yellow().to_string(),
        Outcome::TotalDeletionPrevented => "all marked for deletion, left alone".red().to_string(),
    };
    writeln!(
        w,
        "{} {} files{}  [{}]",
        format!("Set {number}:").bold(),
        decision.verdicts.len(),
        size,
        outcome
    )?;

    for (path, verdict) in &decision.verdicts {
        let label = match verdict {
            Verdict::Keep => verdict.label().green().to_string(),
            Verdict::Delete if decision.is_actionable() => verdict.label().red().to_string(),
            Verdict::Delete => verdict.label().red().dim().to_string(),
            Verdict::Unknown => verdict.label().dim().to_string(),
        };
        writeln!(w, "  {}  {}", label, path.display())?;
    }

    for rule in &decision.trace {
        if rule.verdicts.values().any(|v| *v != Verdict::Unknown) {
            writeln!(w, "    {} {}", "fired:".dim(), rule.label)?;
        }
    }
    writeln!(w)
}

fn write_summary<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    if let Some(stats) = &report.stats {
        writeln!(
            w,
            "Indexed {} files ({}), {} hardlink aliases, {} skipped",
            stats.included.cyan(),
            ByteSize(stats.included_bytes),
            stats.hardlink_aliases,
            stats.total_skipped()
        )?;
        for (reason, count) in &stats.skipped {
            writeln!(w, "  {:>8}  {}", count, reason.dim())?;
        }
        writeln!(w, "{} size groups with 2+ candidates", report.candidate_groups)?;
    }

    writeln!(
        w,
        "{} duplicate sets: {} decided, {} uncertain, {} total deletion prevented",
        report.sets.len().bold(),
        report.count(Outcome::Decided).green(),
        report.count(Outcome::Uncertain).yellow(),
        report.count(Outcome::TotalDeletionPrevented).red()
    )?;
    writeln!(
        w,
        "{} files marked for deletion, {} reclaimable",
        report.deletion_count().red(),
        ByteSize(report.reclaimable()).green()
    )?;

    if let Some(result) = &report.deletion {
        writeln!(w, "{}", result.summary())?;
        for (path, err) in &result.failures {
            writeln!(w, "  {} {}: {}", "failed".red(), path.display(), err)?;
        }
    }
    Ok(())
}
