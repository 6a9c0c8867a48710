//! Logging setup on the `log` facade with an `env_logger` backend.
//!
//! `RUST_LOG`, when set, replaces everything below. Otherwise the crate's own
//! records follow the CLI flags (`-q` error, default info, `-v` debug, `-vv`
//! trace) while dependencies stay at warn until `-vvv`.
//!
//! Records go to stderr, so JSON reports on stdout stay machine-readable.
//!
//! ```rust,no_run
//! use dupekeep::logging::{init_logging, LogOptions};
//!
//! init_logging(&LogOptions { verbose: 1, ..LogOptions::default() });
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

/// Verbosity at which dependency crates are let through at the crate's level.
const DEPENDENCY_VERBOSITY: u8 = 3;

/// How the logger should behave, taken from global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// `-v` count
    pub verbose: u8,
    /// `-q`: errors only
    pub quiet: bool,
    /// Never emit ANSI styling
    pub no_color: bool,
}

impl LogOptions {
    /// Level for records from this crate.
    #[must_use]
    pub fn crate_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Level for records from every other crate.
    #[must_use]
    pub fn dependency_level(&self) -> LevelFilter {
        if self.verbose >= DEPENDENCY_VERBOSITY {
            self.crate_level()
        } else {
            self.crate_level().min(LevelFilter::Warn)
        }
    }
}

/// Install the global logger. A second call leaves the first logger in place.
pub fn init_logging(options: &LogOptions) {
    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    if env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder
            .filter_level(options.dependency_level())
            .filter_module(env!("CARGO_CRATE_NAME"), options.crate_level());
    }
    if options.no_color {
        builder.write_style(WriteStyle::Never);
    }

    let with_module = options.verbose >= 1;
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        write!(buf, "{style}{:<5}{style:#} ", record.level())?;
        if cfg!(debug_assertions) {
            write!(buf, "{} ", buf.timestamp_millis())?;
        }
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("?"))?;
        }
        writeln!(buf, "{}", record.args())
    });

    if builder.try_init().is_ok() {
        log::debug!("Logging at {}", current_level_name());
    }
}

/// The global maximum level, lowercase.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
