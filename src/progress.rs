// src/progress.rs

//! Progress reporting for batch operations
//!
//! The pipeline reports every phase change through a [`ProgressTracker`].
//! The library ships a tracing-backed tracker and a silent one; the CLI
//! provides a terminal renderer on top of indicatif.

use crate::pipeline::InstallPhase;
use std::fmt;
use tracing::{info, warn};

/// Position of a package within its batch (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPosition {
    pub index: usize,
    pub total: usize,
}

impl BatchPosition {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }
}

impl fmt::Display for BatchPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} of {})", self.index, self.total)
    }
}

/// Receives pipeline progress events
pub trait ProgressTracker {
    /// A package entered a new phase
    fn phase(&self, position: BatchPosition, package: &str, version: &str, phase: InstallPhase);

    /// A package went through the whole pipeline
    fn finished(&self, position: BatchPosition, package: &str);

    /// A package failed; the batch moves on
    fn failed(&self, position: BatchPosition, package: &str, error: &str);
}

/// Status line for a phase, e.g. `>>> Downloading (1 of 3) foo=1.2`
pub fn phase_line(position: BatchPosition, package: &str, version: &str, phase: InstallPhase) -> String {
    if version.is_empty() {
        format!(">>> {} {} {}", phase, position, package)
    } else {
        format!(">>> {} {} {}={}", phase, position, package, version)
    }
}

/// No-op tracker for quiet and scripted runs
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressTracker for SilentProgress {
    fn phase(&self, _position: BatchPosition, _package: &str, _version: &str, _phase: InstallPhase) {}

    fn finished(&self, _position: BatchPosition, _package: &str) {}

    fn failed(&self, _position: BatchPosition, _package: &str, _error: &str) {}
}

/// Tracker that reports through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressTracker for LogProgress {
    fn phase(&self, position: BatchPosition, package: &str, version: &str, phase: InstallPhase) {
        info!("{}", phase_line(position, package, version, phase));
    }

    fn finished(&self, position: BatchPosition, package: &str) {
        info!("{} {} done", position, package);
    }

    fn failed(&self, position: BatchPosition, package: &str, error: &str) {
        warn!("{} {} failed: {}", position, package, error);
    }
}
