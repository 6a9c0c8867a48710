//! dupekeep - hardlink-aware duplicate finder with rule-based decisions
//!
//! The pipeline is:
//! indexer (size buckets) → content verifier (duplicate sets) →
//! rule engine (one verdict per path) → deletion plan.
//!
//! The [`scanner`] and [`rules`] modules are usable on their own; [`run_app`]
//! wires everything together for the command-line tool.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod rules;
pub mod scanner;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::actions::{BatchDeleteResult, DeleteConfig, DeletionPlan};
use crate::cli::{Cli, Commands, DecideArgs, OutputFormat, RuleArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{Blake3Verifier, ContentVerifier, DuplicateSet};
use crate::error::ExitCode;
use crate::output::{JsonOutput, Report, SetReport};
use crate::progress::SpinnerSink;
use crate::scanner::Indexer;

/// Run the command described by `cli`.
///
/// # Errors
///
/// Fails on invalid configuration, an unusable root, or an output error.
/// Problems with individual files are reported, not returned.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(&logging::LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => {
            apply_scan_args(&mut config, &args);
            apply_rule_args(&mut config, &args.rules);
            run_scan(&config, &args, cli.verbose, cli.quiet)
        }
        Commands::Decide(args) => {
            apply_rule_args(&mut config, &args.rules);
            run_decide(&config, &args)
        }
    }
}

fn apply_scan_args(config: &mut Config, args: &ScanArgs) {
    let indexer = &mut config.indexer;
    if let Some(min) = args.min_size {
        indexer.min_size = min;
    }
    if args.max_size.is_some() {
        indexer.max_size = args.max_size;
    }
    indexer.follow_symlinks |= args.follow_symlinks;
    indexer.ignore_dirnames.extend(args.ignore_dirs.iter().cloned());
    if args.no_recurse {
        indexer.recursive = false;
    }
}

fn apply_rule_args(config: &mut Config, args: &RuleArgs) {
    let rules = &mut config.rules;
    if args.no_default_rules {
        rules.use_defaults = false;
    }
    rules.keep.extend(args.keep.iter().cloned());
    rules.delete.extend(args.delete.iter().cloned());
    rules.prefer.extend(args.prefer.iter().copied());

    if args.allow_uncertain {
        config.policy.require_certainty = false;
    }
    if args.allow_total_deletion {
        config.policy.forbid_total_deletion = false;
    }
}

fn run_scan(config: &Config, args: &ScanArgs, verbose: u8, quiet: bool) -> Result<ExitCode> {
    let engine = config.rule_engine().context("invalid rule")?;
    let indexer_config = config.indexer.indexer_config(verbose);

    let spinner = SpinnerSink::new(quiet || args.output == OutputFormat::Json);
    let mut indexer = Indexer::new(indexer_config).with_sink(spinner.clone());
    for root in &args.roots {
        indexer
            .add(root, config.indexer.recursive)
            .with_context(|| format!("failed to index {}", root.display()))?;
    }
    spinner.finish(&format!("{} files indexed", indexer.stats().included));

    let (buckets, inodes, stats) = indexer.into_parts();
    let linked = inodes.hardlinked_groups();
    if !linked.is_empty() {
        log::debug!("{} objects reachable through more than one path", linked.len());
    }

    let verifier = Blake3Verifier::new();
    let mut decided: Vec<(DuplicateSet, SetReport)> = Vec::new();
    let mut candidate_groups = 0;
    for (size, paths) in buckets.candidates() {
        candidate_groups += 1;
        for set in verifier.verify(paths) {
            let decision = engine.decide(&set);
            decided.push((
                set,
                SetReport {
                    size: Some(size),
                    decision,
                },
            ));
        }
    }
    log::info!(
        "{} duplicate sets in {} candidate groups",
        decided.len(),
        candidate_groups
    );

    let deletion = args.delete_files.then(|| {
        let delete_config = if args.permanent {
            DeleteConfig::permanent()
        } else {
            DeleteConfig::trash()
        };
        execute_deletions(&decided, &delete_config)
    });

    let report = Report {
        roots: args.roots.clone(),
        stats: Some(stats),
        candidate_groups,
        sets: decided.into_iter().map(|(_, report)| report).collect(),
        deletion,
    };

    let code = exit_code(&report);
    emit(&report, args.output, code)?;
    Ok(code)
}

fn execute_deletions(
    decided: &[(DuplicateSet, SetReport)],
    config: &DeleteConfig,
) -> BatchDeleteResult {
    let mut total = BatchDeleteResult::default();
    for (set, report) in decided {
        match DeletionPlan::from_decision(set, &report.decision) {
            Ok(plan) => total.merge(plan.execute(config)),
            Err(e) => {
                log::warn!("Not deleting from set: {}", e);
                let path = e
                    .path()
                    .map(std::path::Path::to_path_buf)
                    .or_else(|| set.paths().first().cloned())
                    .unwrap_or_default();
                total.failures.push((path, e.to_string()));
            }
        }
    }
    total
}

fn run_decide(config: &Config, args: &DecideArgs) -> Result<ExitCode> {
    let engine = config.rule_engine().context("invalid rule")?;
    let paths = args
        .paths
        .iter()
        .map(|p| std::path::absolute(p).with_context(|| format!("bad path {}", p.display())))
        .collect::<Result<Vec<PathBuf>>>()?;

    let set = DuplicateSet::new(paths);
    let decision = engine.decide(&set);
    let report = Report {
        sets: vec![SetReport {
            size: None,
            decision,
        }],
        ..Report::default()
    };

    let code = if set.len() < 2 {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };
    emit(&report, args.output, code)?;
    Ok(code)
}

fn exit_code(report: &Report) -> ExitCode {
    let deletion_failed = report
        .deletion
        .as_ref()
        .is_some_and(|d| !d.all_succeeded());
    let access_problems = report
        .stats
        .as_ref()
        .is_some_and(scanner::IndexStats::had_access_problems);

    if deletion_failed || access_problems {
        ExitCode::PartialSuccess
    } else if report.sets.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

fn emit(report: &Report, format: OutputFormat, code: ExitCode) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => output::write_text(&mut out, report)?,
        OutputFormat::Json => JsonOutput::new(report, code).write_to(&mut out, true)?,
    }
    out.flush()?;
    Ok(())
}
