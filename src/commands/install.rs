// src/commands/install.rs
//! Package installation, removal and update commands

use super::open_catalog;
use super::progress::CliProgress;
use anyhow::{Context, Result, bail};
use srcpm::batch::{BatchReport, BatchStatus, Classification};
use srcpm::db::models::Package;
use srcpm::{
    BatchOptions, BatchRunner, Config, LogProgress, MakeBuilder, Operation, ProgressTracker,
    preflight, prompt,
};
use std::io::IsTerminal;
use tracing::info;

/// Flags shared by the package commands
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageFlags {
    pub force: bool,
    pub keep: bool,
    pub yes: bool,
    pub no_deps: bool,
}

impl PackageFlags {
    fn batch_options(&self, config: &Config) -> BatchOptions {
        BatchOptions::default()
            .with_force(self.force)
            .with_keep_sources(self.keep)
            .with_assume_yes(self.yes)
            .with_resolve_dependencies(!self.no_deps)
            .with_verbose(config.verbose)
            .with_work_dir(&config.work_dir)
            .with_source_dir(&config.source_dir)
    }
}

/// Build and install packages
pub fn cmd_install(config: &Config, packages: &[String], flags: PackageFlags) -> Result<()> {
    run_batch(config, Operation::Install, packages, flags)
}

/// Uninstall packages
pub fn cmd_uninstall(config: &Config, packages: &[String], flags: PackageFlags) -> Result<()> {
    run_batch(config, Operation::Uninstall, packages, flags)
}

/// Update installed packages, or only list the available updates
pub fn cmd_update(
    config: &Config,
    packages: &[String],
    all: bool,
    check: bool,
    flags: PackageFlags,
) -> Result<()> {
    let mut requested = packages.to_vec();

    if check || all {
        let conn = open_catalog(&config.db_path)?;
        let outdated = Package::list_outdated(&conn).context("Failed to list installed packages")?;

        if check {
            if outdated.is_empty() {
                println!("No new updates available.");
            }
            for pkg in &outdated {
                println!(
                    "Update available for {}, Current version: {} | New version: {}",
                    pkg.name, pkg.installed_version, pkg.repo_version
                );
            }
            return Ok(());
        }

        requested.extend(outdated.into_iter().map(|pkg| pkg.name));
    }

    if requested.is_empty() {
        println!("No package selected for update. Name packages or use --all.");
        return Ok(());
    }

    run_batch(config, Operation::Update, &requested, PackageFlags { no_deps: true, ..flags })
}

fn run_batch(
    config: &Config,
    operation: Operation,
    packages: &[String],
    flags: PackageFlags,
) -> Result<()> {
    preflight::require_root(&operation.to_string())?;
    let conn = open_catalog(&config.db_path)?;

    let builder = MakeBuilder::new();
    // Plain log lines when stderr is not a terminal
    let bar = std::io::stderr().is_terminal().then(|| {
        CliProgress::new(match operation {
            Operation::Install => "Installing",
            Operation::Uninstall => "Uninstalling",
            Operation::Update => "Updating",
        })
    });
    let progress: &dyn ProgressTracker = match &bar {
        Some(bar) => bar,
        None => &LogProgress,
    };
    let runner = BatchRunner::new(&conn, &builder, progress, flags.batch_options(config));

    let report = runner
        .run(operation, packages, &mut prompt::stdio_prompt())
        .with_context(|| format!("{} aborted", operation))?;

    match report.status {
        BatchStatus::NothingToDo => {
            print_skipped(&report);
            println!("No package selected for any operation.");
            Ok(())
        }
        BatchStatus::Declined => {
            println!("Nothing was changed.");
            Ok(())
        }
        BatchStatus::Completed => {
            print_skipped(&report);
            finish(config, &report, bar.as_ref())
        }
    }
}

fn print_skipped(report: &BatchReport) {
    for (name, classification) in &report.requested {
        let reason = match classification {
            Classification::Marked => continue,
            Classification::NotInCatalog => "not in the catalog",
            Classification::AlreadyInstalled => {
                "already installed (use --force/-f to reinstall)"
            }
            Classification::NotInstalled => "not installed",
            Classification::UpToDate => "already up to date",
        };
        println!("Skipped {}: {}", name, reason);
    }
    for missing in &report.missing_dependencies {
        println!(
            "{} depends on {}, which is not in the catalog; install it yourself",
            missing.dependent, missing.name
        );
    }
}

fn finish(config: &Config, report: &BatchReport, bar: Option<&CliProgress>) -> Result<()> {
    if config.verbose {
        for success in &report.succeeded {
            if !success.outcome.build_output.is_empty() {
                println!("{}", success.outcome.build_output);
            }
        }
        for failure in &report.failed {
            if let Some(output) = failure.error.build_output() {
                println!("{}", output);
            }
        }
    }

    for name in report.unrecorded() {
        eprintln!(
            "warning: {} was processed but the catalog could not be updated; fix it with `srcpm catalog manage`",
            name
        );
    }

    let done = report.succeeded.len();
    info!("{} of {} package(s) processed", done, report.marked.len());

    if report.is_success() {
        if let Some(bar) = bar {
            bar.finish(&format!("{} package(s) done", done));
        }
        Ok(())
    } else {
        if let Some(bar) = bar {
            bar.finish_with_error(&format!("{} package(s) failed", report.failed.len()));
        }
        for failure in &report.failed {
            eprintln!("  {}: {}", failure.name, failure.error);
        }
        bail!(
            "{} of {} package(s) failed",
            report.failed.len(),
            report.marked.len()
        )
    }
}
