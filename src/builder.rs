// src/builder.rs

//! External build step
//!
//! Packages are built and removed by running `make install` or
//! `make uninstall` in a directory that holds the package's `Makefile`.
//! The [`Builder`] trait is the seam the pipeline calls through, so tests
//! can substitute a recording implementation.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured output of a successful build action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    /// Interleaved stdout and stderr
    pub output: String,
}

/// Runs the install and uninstall actions of a build descriptor
pub trait Builder {
    /// Build and install from `dir`
    fn install(&self, dir: &Path) -> Result<BuildOutput>;

    /// Remove what `install` put in place, driven from `dir`
    fn uninstall(&self, dir: &Path) -> Result<BuildOutput>;
}

/// `make`-driven builder running through `bash -c`
#[derive(Debug, Clone)]
pub struct MakeBuilder {
    program: String,
}

impl Default for MakeBuilder {
    fn default() -> Self {
        Self {
            program: "make".to_string(),
        }
    }
}

impl MakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different make command, e.g. `gmake` or `make -j4`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run_target(&self, dir: &Path, target: &str) -> Result<BuildOutput> {
        let script = format!("{} {} 2>&1", self.program, target);
        debug!("Running `{}` in {}", script, dir.display());

        let output = Command::new("bash")
            .arg("-c")
            .arg(&script)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::BuildError {
                message: format!("Failed to spawn `{}` in {}: {e}", script, dir.display()),
                output: String::new(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        for line in combined.lines() {
            debug!("[{}] {}", target, line);
        }

        if output.status.success() {
            Ok(BuildOutput { output: combined })
        } else {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "a signal".to_string(),
            };
            Err(Error::BuildError {
                message: format!("`{}` in {} failed with {}", script, dir.display(), status),
                output: combined,
            })
        }
    }
}

impl Builder for MakeBuilder {
    fn install(&self, dir: &Path) -> Result<BuildOutput> {
        self.run_target(dir, "install")
    }

    fn uninstall(&self, dir: &Path) -> Result<BuildOutput> {
        self.run_target(dir, "uninstall")
    }
}
