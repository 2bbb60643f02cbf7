// src/batch.rs

//! Batch orchestration for install, uninstall and update requests
//!
//! A batch classifies every requested name against the catalog, builds
//! the [`MarkedSet`] (dependencies first for installs), asks for
//! confirmation, then runs the pipeline once per marked package in order.
//! A package that fails is recorded and the batch moves on; a failed
//! dependency does not stop the packages that need it.

use crate::builder::Builder;
use crate::config::{DEFAULT_SOURCE_DIR, DEFAULT_WORK_DIR};
use crate::db::models::Package;
use crate::error::{Error, Result};
use crate::pipeline::{InstallOutcome, Pipeline, PipelineOptions};
use crate::progress::{BatchPosition, ProgressTracker};
use crate::prompt::Confirm;
use crate::resolver::{MarkedSet, MissingDependency, Resolver};
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Question shown before any pipeline work
pub const CONFIRM_QUESTION: &str = "Do you want to perform this operation?";

/// What a batch does to its packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Update => "update",
        })
    }
}

/// Options for one batch
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Reinstall installed packages and skip hash verification
    pub force: bool,
    /// Keep extracted sources under `source_dir`
    pub keep_sources: bool,
    /// Do not ask for confirmation
    pub assume_yes: bool,
    /// Mark missing dependencies of requested installs
    pub resolve_dependencies: bool,
    /// Log the plan and each finished package at info level
    pub verbose: bool,
    pub work_dir: PathBuf,
    pub source_dir: PathBuf,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            force: false,
            keep_sources: false,
            assume_yes: false,
            resolve_dependencies: true,
            verbose: false,
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
        }
    }
}

impl BatchOptions {
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_keep_sources(mut self, keep: bool) -> Self {
        self.keep_sources = keep;
        self
    }

    pub fn with_assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn with_resolve_dependencies(mut self, resolve: bool) -> Self {
        self.resolve_dependencies = resolve;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            work_dir: self.work_dir.clone(),
            source_dir: self.source_dir.clone(),
            force: self.force,
            keep_sources: self.keep_sources,
        }
    }
}

/// How a requested name was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    NotInCatalog,
    AlreadyInstalled,
    NotInstalled,
    UpToDate,
    Marked,
}

/// How the batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Nothing was marked
    NothingToDo,
    /// The operator said no
    Declined,
    /// Every marked package went through the pipeline
    Completed,
}

/// A package that failed in the pipeline
#[derive(Debug)]
pub struct PackageFailure {
    pub name: String,
    pub error: Error,
}

/// A package that went through the pipeline
#[derive(Debug, Clone)]
pub struct PackageSuccess {
    pub name: String,
    pub outcome: InstallOutcome,
}

/// Everything that happened in one batch
#[derive(Debug)]
pub struct BatchReport {
    pub operation: Operation,
    pub status: BatchStatus,
    /// Requested names with their classification, in request order
    pub requested: Vec<(String, Classification)>,
    /// Processing order
    pub marked: Vec<String>,
    pub missing_dependencies: Vec<MissingDependency>,
    pub succeeded: Vec<PackageSuccess>,
    pub failed: Vec<PackageFailure>,
}

impl BatchReport {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            status: BatchStatus::NothingToDo,
            requested: Vec::new(),
            marked: Vec::new(),
            missing_dependencies: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn classification(&self, name: &str) -> Option<Classification> {
        self.requested
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Packages whose catalog state could not be written after the action
    pub fn unrecorded(&self) -> impl Iterator<Item = &str> {
        self.succeeded
            .iter()
            .filter(|s| !s.outcome.catalog_updated)
            .map(|s| s.name.as_str())
    }
}

/// Runs one batch against the catalog
pub struct BatchRunner<'a> {
    conn: &'a Connection,
    builder: &'a dyn Builder,
    progress: &'a dyn ProgressTracker,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        conn: &'a Connection,
        builder: &'a dyn Builder,
        progress: &'a dyn ProgressTracker,
        options: BatchOptions,
    ) -> Self {
        Self {
            conn,
            builder,
            progress,
            options,
        }
    }

    /// Classify, confirm and process `names`
    pub fn run(
        &self,
        operation: Operation,
        names: &[String],
        confirm: &mut dyn Confirm,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::new(operation);
        let mut marked = MarkedSet::new();
        let mut resolver = Resolver::new(self.conn);

        for name in names {
            let classification = self.classify(operation, name, &mut marked, &mut resolver, &mut report)?;
            report.requested.push((name.clone(), classification));
        }

        if marked.is_empty() {
            info!("No package selected for any operation");
            return Ok(report);
        }

        let plan = self.describe_plan(operation, &marked)?;
        for line in &plan {
            if self.options.verbose {
                info!("{}", line);
            } else {
                debug!("{}", line);
            }
        }

        if !self.options.assume_yes && !confirm.confirm(CONFIRM_QUESTION, &plan)? {
            info!("Operation declined, nothing was changed");
            report.status = BatchStatus::Declined;
            report.marked = marked.into_vec();
            return Ok(report);
        }

        let pipeline = Pipeline::new(
            self.conn,
            self.builder,
            self.progress,
            self.options.pipeline_options(),
        )?;

        let total = marked.len();
        for (index, name) in marked.iter().enumerate() {
            let position = BatchPosition::new(index + 1, total);
            match self.process(&pipeline, operation, name, position) {
                Ok(outcome) => {
                    log_build_output(name, &outcome.build_output);
                    if self.options.verbose {
                        info!("{} {}: done", operation, name);
                    }
                    self.progress.finished(position, name);
                    report.succeeded.push(PackageSuccess {
                        name: name.to_string(),
                        outcome,
                    });
                }
                Err(e) => {
                    error!("{}", e);
                    if let Some(output) = e.build_output() {
                        log_build_output(name, output);
                    }
                    self.progress.failed(position, name, &e.to_string());
                    report.failed.push(PackageFailure {
                        name: name.to_string(),
                        error: e,
                    });
                }
            }
        }

        report.status = BatchStatus::Completed;
        report.marked = marked.into_vec();
        Ok(report)
    }

    fn classify(
        &self,
        operation: Operation,
        name: &str,
        marked: &mut MarkedSet,
        resolver: &mut Resolver<'_>,
        report: &mut BatchReport,
    ) -> Result<Classification> {
        let Some(package) = Package::find(self.conn, name)? else {
            warn!("The package named {} is not in the catalog, skipping", name);
            return Ok(Classification::NotInCatalog);
        };

        let classification = match operation {
            Operation::Install if package.installed && !self.options.force => {
                info!(
                    "{} is already installed, re-run with --force/-f to reinstall it; skipping",
                    name
                );
                Classification::AlreadyInstalled
            }
            Operation::Install => {
                if self.options.resolve_dependencies {
                    let resolved = resolver.resolve(name, &package.dependencies, marked)?;
                    report.missing_dependencies.extend(resolved.missing);
                } else if !package.dependencies.trim().is_empty() {
                    info!(
                        "{} lists [{}] as dependencies; they are not resolved, install them yourself",
                        name,
                        package.dependency_names().collect::<Vec<_>>().join(", ")
                    );
                }
                marked.mark(name);
                Classification::Marked
            }
            Operation::Uninstall if !package.installed => {
                info!("{} is not installed, skipping", name);
                Classification::NotInstalled
            }
            Operation::Uninstall => {
                marked.mark(name);
                Classification::Marked
            }
            Operation::Update if !package.installed => {
                warn!("{} is not installed, skipping", name);
                Classification::NotInstalled
            }
            Operation::Update if package.installed_version == package.repo_version => {
                info!("No updates available for {}", name);
                Classification::UpToDate
            }
            Operation::Update => {
                marked.mark(name);
                Classification::Marked
            }
        };

        debug!("{} {}: {:?}", operation, name, classification);
        Ok(classification)
    }

    fn describe_plan(&self, operation: Operation, marked: &MarkedSet) -> Result<Vec<String>> {
        marked
            .iter()
            .map(|name| {
                let pkg = Package::get(self.conn, name)?;
                Ok(match operation {
                    Operation::Install => format!("Installing {}={}", pkg.name, pkg.repo_version),
                    Operation::Uninstall => {
                        format!("Uninstalling {}={}", pkg.name, pkg.installed_version)
                    }
                    Operation::Update => format!(
                        "Updating {} from version {} to version {}",
                        pkg.name, pkg.installed_version, pkg.repo_version
                    ),
                })
            })
            .collect()
    }

    fn process(
        &self,
        pipeline: &Pipeline<'_>,
        operation: Operation,
        name: &str,
        position: BatchPosition,
    ) -> Result<InstallOutcome> {
        let package = Package::get(self.conn, name)?;
        match operation {
            Operation::Install | Operation::Update => pipeline.install(&package, position),
            Operation::Uninstall => pipeline.uninstall(&package, position),
        }
    }
}

/// Build output goes to the debug log; the CLI prints it when verbose
fn log_build_output(name: &str, output: &str) {
    for line in output.lines() {
        debug!("[{}] {}", name, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildOutput;
    use crate::db::schema;
    use crate::progress::SilentProgress;
    use crate::prompt::AutoConfirm;
    use std::path::Path;
    use tempfile::NamedTempFile;

    struct NoopBuilder;

    impl Builder for NoopBuilder {
        fn install(&self, _dir: &Path) -> Result<BuildOutput> {
            Ok(BuildOutput::default())
        }

        fn uninstall(&self, _dir: &Path) -> Result<BuildOutput> {
            Ok(BuildOutput::default())
        }
    }

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn add(conn: &Connection, name: &str, deps: &str, installed: bool) {
        let mut pkg = Package::new(name, "1.0");
        pkg.build_files_dir = format!("/srv/{name}");
        pkg.dependencies = deps.to_string();
        pkg.insert(conn).unwrap();
        if installed {
            Package::set_installed(conn, name, true).unwrap();
            Package::set_installed_version(conn, name, "1.0").unwrap();
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_names_skipped() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "", false);
        let before = Package::list_all(&conn).unwrap();

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(Operation::Install, &names(&["ghost"]), &mut AutoConfirm(true))
            .unwrap();

        assert_eq!(report.status, BatchStatus::NothingToDo);
        assert_eq!(report.classification("ghost"), Some(Classification::NotInCatalog));
        assert_eq!(Package::list_all(&conn).unwrap(), before);
    }

    #[test]
    fn test_declined_changes_nothing() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "bar", false);
        add(&conn, "bar", "", false);

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(Operation::Install, &names(&["foo"]), &mut AutoConfirm(false))
            .unwrap();

        assert_eq!(report.status, BatchStatus::Declined);
        assert_eq!(report.marked, names(&["bar", "foo"]));
        assert!(report.succeeded.is_empty());
        assert!(!Package::is_installed(&conn, "foo").unwrap());
    }

    #[test]
    fn test_already_installed_without_force() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "", true);

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(Operation::Install, &names(&["foo"]), &mut AutoConfirm(true))
            .unwrap();

        assert_eq!(report.status, BatchStatus::NothingToDo);
        assert_eq!(report.classification("foo"), Some(Classification::AlreadyInstalled));
    }

    #[test]
    fn test_uninstall_not_installed() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "", false);

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(Operation::Uninstall, &names(&["foo"]), &mut AutoConfirm(true))
            .unwrap();

        assert_eq!(report.status, BatchStatus::NothingToDo);
        assert_eq!(report.classification("foo"), Some(Classification::NotInstalled));
    }

    #[test]
    fn test_uninstall_clears_state() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "", true);
        let source_dir = tempfile::tempdir().unwrap();

        let options = BatchOptions::default().with_source_dir(source_dir.path());
        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, options);
        let report = runner
            .run(Operation::Uninstall, &names(&["foo"]), &mut AutoConfirm(true))
            .unwrap();

        assert_eq!(report.status, BatchStatus::Completed);
        assert!(report.is_success());
        let foo = Package::get(&conn, "foo").unwrap();
        assert!(!foo.installed);
        assert_eq!(foo.installed_version, "");
    }

    #[test]
    fn test_update_classification() {
        let (_temp, conn) = create_test_db();
        add(&conn, "current", "", true);
        add(&conn, "stale", "", true);
        add(&conn, "absent", "", false);
        Package::set_repo_version(&conn, "stale", "2.0").unwrap();

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(
                Operation::Update,
                &names(&["current", "stale", "absent"]),
                &mut AutoConfirm(false),
            )
            .unwrap();

        assert_eq!(report.classification("current"), Some(Classification::UpToDate));
        assert_eq!(report.classification("stale"), Some(Classification::Marked));
        assert_eq!(report.classification("absent"), Some(Classification::NotInstalled));
        assert_eq!(report.marked, names(&["stale"]));
    }

    #[test]
    fn test_without_dependency_resolution() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "bar", false);
        add(&conn, "bar", "", false);

        let options = BatchOptions::default().with_resolve_dependencies(false);
        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, options);
        let report = runner
            .run(Operation::Install, &names(&["foo"]), &mut AutoConfirm(false))
            .unwrap();

        assert_eq!(report.marked, names(&["foo"]));
    }

    #[test]
    fn test_requested_twice_marked_once() {
        let (_temp, conn) = create_test_db();
        add(&conn, "foo", "bar", false);
        add(&conn, "bar", "", false);

        let runner = BatchRunner::new(&conn, &NoopBuilder, &SilentProgress, BatchOptions::default());
        let report = runner
            .run(
                Operation::Install,
                &names(&["bar", "foo", "foo"]),
                &mut AutoConfirm(false),
            )
            .unwrap();

        assert_eq!(report.marked, names(&["bar", "foo"]));
    }
}
