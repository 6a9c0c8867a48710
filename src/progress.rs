//! Progress and diagnostic reporting.
//!
//! The indexer reports through a [`ProgressSink`]: a callback taking one
//! human-readable line. Any `Fn(&str)` closure is a sink, [`NullSink`] is
//! silence, and [`SpinnerSink`] renders to an indicatif spinner for the CLI.
//!
//! Periodic status updates are time-gated with a [`Throttle`] so a slow
//! terminal is not flooded while scanning.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Default gap between two status updates.
pub const STATUS_INTERVAL: Duration = Duration::from_millis(8);

/// Receiver of human-readable progress lines.
pub trait ProgressSink {
    /// Called with a diagnostic line (skips, aliases, access failures).
    fn line(&self, message: &str);

    /// Called with a transient status line (e.g. "N included, scanning...").
    ///
    /// Defaults to [`line`](Self::line); sinks that can overwrite a status
    /// area should do so here.
    fn status(&self, message: &str) {
        self.line(message);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&str),
{
    fn line(&self, message: &str) {
        self(message);
    }
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn line(&self, _message: &str) {}
}

/// Wall-clock gate allowing at most one event per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(STATUS_INTERVAL)
    }
}

impl Throttle {
    /// Create a throttle with the given minimum interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` (and restarts the interval) if an event may fire now.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    fn ready_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) <= self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Spinner-backed sink for terminal output.
///
/// Status lines replace the spinner message; diagnostic lines are printed
/// above the spinner so they stay visible. Clones share one spinner.
#[derive(Clone)]
pub struct SpinnerSink {
    bar: ProgressBar,
}

impl SpinnerSink {
    /// Create a new spinner.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { bar }
    }

    /// Stop the spinner, leaving a final message.
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressSink for SpinnerSink {
    fn line(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.bar.println(message);
    }

    fn status(&self, message: &str) {
        self.bar.set_message(truncate_middle(message, 80));
    }
}

/// Shorten a long line for a one-line status area, keeping both ends.
fn truncate_middle(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars || max_chars < 5 {
        return s.to_string();
    }
    let keep = max_chars - 3;
    let head: String = s.chars().take(keep / 2).collect();
    let tail: String = s.chars().skip(count - (keep - keep / 2)).collect();
    format!("{head}...{tail}")
}
