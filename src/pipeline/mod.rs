// src/pipeline/mod.rs

//! Install and uninstall pipeline for a single package
//!
//! Install runs strictly in order:
//!
//! 1. recreate the working directory
//! 2. download the source archive
//! 3. verify its SHA-512 (skipped with `force`)
//! 4. extract it and locate the top-level source directory
//! 5. copy the package's `Makefile` into that directory
//! 6. run `make install`
//! 7. record the installed state in the catalog
//! 8. remove the working directory (unless sources are kept)
//!
//! A failing step stops the pipeline and is reported as
//! [`Error::PipelineError`] naming the step. Catalog writes in step 7 happen
//! after the package is already on disk, so their failures are logged and
//! surfaced through [`InstallOutcome::catalog_updated`] instead.

use crate::archive;
use crate::builder::Builder;
use crate::config::{DEFAULT_SOURCE_DIR, DEFAULT_WORK_DIR};
use crate::db::models::Package;
use crate::error::{Error, Result};
use crate::hash;
use crate::progress::{BatchPosition, ProgressTracker};
use crate::repository::RepositoryClient;
use rusqlite::Connection;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Phases a package goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Preparing,
    Downloading,
    Verifying,
    Extracting,
    Building,
    Uninstalling,
    UpdatingState,
    Cleaning,
}

impl InstallPhase {
    /// Short step name used in error messages
    pub fn step(&self) -> &'static str {
        match self {
            Self::Preparing => "prepare",
            Self::Downloading => "download",
            Self::Verifying => "verify",
            Self::Extracting => "extract",
            Self::Building => "build",
            Self::Uninstalling => "uninstall",
            Self::UpdatingState => "state update",
            Self::Cleaning => "cleanup",
        }
    }
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Preparing => "Preparing",
            Self::Downloading => "Downloading",
            Self::Verifying => "Verifying",
            Self::Extracting => "Extracting",
            Self::Building => "Installing",
            Self::Uninstalling => "Uninstalling",
            Self::UpdatingState => "Recording",
            Self::Cleaning => "Cleaning",
        };
        f.write_str(label)
    }
}

/// Pipeline settings shared by every package in a batch
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Parent of throw-away working directories
    pub work_dir: PathBuf,
    /// Parent of working directories that are kept
    pub source_dir: PathBuf,
    /// Skip the archive hash check
    pub force: bool,
    /// Keep extracted sources under `source_dir`
    pub keep_sources: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            force: false,
            keep_sources: false,
        }
    }
}

impl PipelineOptions {
    /// Working directory for one package
    pub fn workdir_for(&self, name: &str) -> PathBuf {
        if self.keep_sources {
            self.source_dir.join(name)
        } else {
            self.work_dir.join(name)
        }
    }
}

/// Result of a successful pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Whether both catalog writes after the build succeeded
    pub catalog_updated: bool,
    /// Combined output of the build action
    pub build_output: String,
    /// Sources left on disk, when kept
    pub kept_sources: Option<PathBuf>,
}

/// Runs install and uninstall for one package at a time
pub struct Pipeline<'a> {
    conn: &'a Connection,
    builder: &'a dyn Builder,
    progress: &'a dyn ProgressTracker,
    client: RepositoryClient,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        conn: &'a Connection,
        builder: &'a dyn Builder,
        progress: &'a dyn ProgressTracker,
        options: PipelineOptions,
    ) -> Result<Self> {
        Ok(Self {
            conn,
            builder,
            progress,
            client: RepositoryClient::new()?,
            options,
        })
    }

    /// Download, verify, build and record one package
    pub fn install(&self, package: &Package, position: BatchPosition) -> Result<InstallOutcome> {
        let name = package.name.as_str();
        let version = package.repo_version.as_str();
        let workdir = self.options.workdir_for(name);

        self.enter(position, package, version, InstallPhase::Preparing);
        step(name, InstallPhase::Preparing, prepare_workdir(&workdir))?;

        self.enter(position, package, version, InstallPhase::Downloading);
        let archive_path = workdir.join(format!("{name}.tar.gz"));
        step(
            name,
            InstallPhase::Downloading,
            self.client.download_file(&package.archive_url, &archive_path),
        )?;

        if self.options.force {
            debug!("Skipping hash verification of {} (forced)", name);
        } else {
            self.enter(position, package, version, InstallPhase::Verifying);
            step(name, InstallPhase::Verifying, verify_archive(package, &archive_path))?;
        }

        self.enter(position, package, version, InstallPhase::Extracting);
        let source_tree = step(
            name,
            InstallPhase::Extracting,
            extract_source_tree(&workdir, &archive_path),
        )?;

        self.enter(position, package, version, InstallPhase::Building);
        let build_output = step(
            name,
            InstallPhase::Building,
            archive::copy_build_descriptor(Path::new(&package.build_files_dir), &source_tree)
                .and_then(|_| self.builder.install(&source_tree)),
        )?;

        self.enter(position, package, version, InstallPhase::UpdatingState);
        let catalog_updated = self.record_state(name, true, version);

        let kept_sources = if self.options.keep_sources {
            info!("Keeping sources of {} in {}", name, workdir.display());
            Some(workdir)
        } else {
            self.enter(position, package, version, InstallPhase::Cleaning);
            step(name, InstallPhase::Cleaning, remove_dir(&workdir))?;
            None
        };

        Ok(InstallOutcome {
            catalog_updated,
            build_output: build_output.output,
            kept_sources,
        })
    }

    /// Run the package's uninstall action and clear its installed state
    pub fn uninstall(&self, package: &Package, position: BatchPosition) -> Result<InstallOutcome> {
        let name = package.name.as_str();
        let version = package.installed_version.as_str();

        self.enter(position, package, version, InstallPhase::Uninstalling);
        let build_output = step(
            name,
            InstallPhase::Uninstalling,
            self.builder.uninstall(Path::new(&package.build_files_dir)),
        )?;

        let kept_dir = self.options.source_dir.join(name);
        let kept_sources = if self.options.keep_sources {
            kept_dir.exists().then_some(kept_dir)
        } else {
            if kept_dir.exists() {
                self.enter(position, package, version, InstallPhase::Cleaning);
                step(name, InstallPhase::Cleaning, remove_dir(&kept_dir))?;
            }
            None
        };

        self.enter(position, package, version, InstallPhase::UpdatingState);
        let catalog_updated = self.record_state(name, false, "");

        Ok(InstallOutcome {
            catalog_updated,
            build_output: build_output.output,
            kept_sources,
        })
    }

    fn enter(&self, position: BatchPosition, package: &Package, version: &str, phase: InstallPhase) {
        debug!("{}: {}", package.name, phase);
        self.progress.phase(position, &package.name, version, phase);
    }

    /// Two independent writes; failures are logged, never returned
    fn record_state(&self, name: &str, installed: bool, version: &str) -> bool {
        let mut ok = true;
        if let Err(e) = Package::set_installed(self.conn, name, installed) {
            error!(
                "Could not mark {} as {} in the catalog, although it is: {}",
                name,
                if installed { "installed" } else { "not installed" },
                e
            );
            ok = false;
        }
        if let Err(e) = Package::set_installed_version(self.conn, name, version) {
            error!(
                "Could not record the installed version of {} in the catalog: {}",
                name, e
            );
            ok = false;
        }
        ok
    }
}

fn step<T>(package: &str, phase: InstallPhase, result: Result<T>) -> Result<T> {
    result.map_err(|source| Error::PipelineError {
        package: package.to_string(),
        phase: phase.step().to_string(),
        source: Box::new(source),
    })
}

fn prepare_workdir(workdir: &Path) -> Result<()> {
    if workdir.exists() {
        remove_dir(workdir)?;
    }
    fs::create_dir_all(workdir).map_err(|e| {
        Error::IoError(format!(
            "Failed to create working directory {}: {e}",
            workdir.display()
        ))
    })
}

fn remove_dir(dir: &Path) -> Result<()> {
    fs::remove_dir_all(dir)
        .map_err(|e| Error::IoError(format!("Failed to remove {}: {e}", dir.display())))
}

fn verify_archive(package: &Package, archive_path: &Path) -> Result<()> {
    if hash::verify_file_sha512(archive_path, &package.sha512)? {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            package: package.name.clone(),
            expected: package.sha512.clone(),
            actual: hash::sha512_file(archive_path)?,
        })
    }
}

fn extract_source_tree(workdir: &Path, archive_path: &Path) -> Result<PathBuf> {
    let extracted = archive::untar(workdir, archive_path)?;
    extracted.top_level.ok_or_else(|| {
        Error::ExtractError(format!(
            "{} has no top-level directory",
            archive_path.display()
        ))
    })
}
