// src/commands/progress.rs
//! Terminal progress for batch operations
//!
//! One status line per phase (`>>> Downloading (1 of 3) foo=1.2`) printed
//! above an overall progress bar.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use srcpm::progress::{BatchPosition, ProgressTracker, phase_line};
use srcpm::InstallPhase;

/// indicatif-backed tracker for interactive runs
pub struct CliProgress {
    overall: ProgressBar,
}

impl CliProgress {
    /// Create a tracker; it stays hidden until the first pipeline event
    pub fn new(operation: &str) -> Self {
        let overall = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        let style = ProgressStyle::default_bar()
            .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
            .map(|s| s.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        overall.set_style(style);
        overall.set_message(operation.to_string());
        Self { overall }
    }

    /// Finish the overall bar with a summary
    pub fn finish(&self, message: &str) {
        self.overall.finish_with_message(message.to_string());
    }

    /// Abandon the overall bar, leaving it on screen
    pub fn finish_with_error(&self, message: &str) {
        self.overall.abandon_with_message(message.to_string());
    }
}

impl ProgressTracker for CliProgress {
    fn phase(&self, position: BatchPosition, package: &str, version: &str, phase: InstallPhase) {
        if self.overall.is_hidden() {
            self.overall.set_draw_target(ProgressDrawTarget::stderr());
        }
        self.overall.set_length(position.total as u64);
        self.overall.println(phase_line(position, package, version, phase));
    }

    fn finished(&self, _position: BatchPosition, _package: &str) {
        self.overall.inc(1);
    }

    fn failed(&self, _position: BatchPosition, package: &str, error: &str) {
        self.overall.println(format!("!!! {} failed: {}", package, error));
        self.overall.inc(1);
    }
}
