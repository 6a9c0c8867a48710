//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Index, verify and report what the default rules decide
//! dupekeep scan ~/Pictures /mnt/backup
//!
//! # Prefer the deepest copy, and act on it (to trash)
//! dupekeep scan ~/Pictures --prefer deepest --delete-files
//!
//! # Ask the rule engine about a set you already know is identical
//! dupekeep decide /a/photo.jpg /backup/photo.jpg --output json
//! ```

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::rules::Preference;

/// Hardlink-aware duplicate finder with rule-based keep/delete decisions.
#[derive(Debug, Parser)]
#[command(name = "dupekeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    ///
    /// Also raises scan diagnostics: -v reports aliases and special files,
    /// -vv ignored directories and symlinks, -vvv small files.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index roots, verify duplicates and decide what to keep
    Scan(ScanArgs),
    /// Decide a single set of paths known to be identical
    Decide(DecideArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories or files to index
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Minimum file size to consider (e.g., 1KB, 1MB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Follow symbolic links during the scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Directory name to skip wherever it appears (can be repeated)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    pub ignore_dirs: Vec<String>,

    /// Only look at the immediate contents of each root
    #[arg(long)]
    pub no_recurse: bool,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Carry out the deletions (to trash unless --permanent)
    #[arg(long)]
    pub delete_files: bool,

    /// Delete permanently instead of moving to trash
    ///
    /// Warning: files cannot be recovered.
    #[arg(long, requires = "delete_files")]
    pub permanent: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the decide subcommand.
#[derive(Debug, Args)]
pub struct DecideArgs {
    /// Paths with identical content
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Rule selection shared by both subcommands.
#[derive(Debug, Args, Default)]
pub struct RuleArgs {
    /// Keep paths matching this regex (can be repeated)
    #[arg(long = "keep", value_name = "REGEX")]
    pub keep: Vec<String>,

    /// Delete paths matching this regex, keep the rest (can be repeated)
    #[arg(long = "delete", value_name = "REGEX")]
    pub delete: Vec<String>,

    /// Tie-breaking strategy (can be repeated)
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub prefer: Vec<Preference>,

    /// Do not start from the protective default rules
    #[arg(long)]
    pub no_default_rules: bool,

    /// Act on sets where some member is undecided
    #[arg(long)]
    pub allow_uncertain: bool,

    /// Allow a decision that deletes every copy to stand in the report
    ///
    /// Deletion itself always keeps at least one copy.
    #[arg(long)]
    pub allow_total_deletion: bool,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

/// Parse a size such as `4096`, `1.5MB` or `2 GiB` into bytes.
///
/// Decimal (`KB`, `MB`, ...) and binary (`KiB`, `MiB`, ...) units are
/// accepted, case-insensitively; a bare number is bytes.
///
/// ```
/// use dupekeep::cli::parse_size;
///
/// assert_eq!(parse_size("1KB"), Ok(1000));
/// assert_eq!(parse_size("1KiB"), Ok(1024));
/// ```
///
/// # Errors
///
/// Returns a message clap shows next to the offending flag.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("size cannot be empty".to_string());
    }
    s.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("invalid size '{s}': {e}"))
}
