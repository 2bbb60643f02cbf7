// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use rusqlite::Connection;
use srcpm::db::{self, models::Package};
use srcpm::progress::{BatchPosition, ProgressTracker};
use srcpm::{BatchOptions, BuildOutput, Builder, Error, InstallPhase, Result};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch catalog with work and source directories beside it.
///
/// Keep the value alive for the duration of the test; the directory is
/// removed on drop.
pub struct TestCatalog {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub conn: Connection,
}

impl TestCatalog {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("repo").join("main.db");
        let conn = db::init(&db_path).unwrap();
        Self {
            temp_dir,
            db_path,
            conn,
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    pub fn source_dir(&self) -> PathBuf {
        self.temp_dir.path().join("sources")
    }

    /// Batch options pointing at this catalog's scratch directories
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::default()
            .with_assume_yes(true)
            .with_work_dir(self.work_dir())
            .with_source_dir(self.source_dir())
    }

    /// Insert a package whose build files directory holds a Makefile
    pub fn add_package(&self, name: &str, version: &str, archive_url: &str, sha512: &str, deps: &str) {
        let mut package = Package::new(name, version);
        package.archive_url = archive_url.to_string();
        package.sha512 = sha512.to_string();
        package.dependencies = deps.to_string();
        package.apply_defaults(&self.db_path);

        fs::create_dir_all(&package.build_files_dir).unwrap();
        fs::write(
            Path::new(&package.build_files_dir).join("Makefile"),
            format!("install:\n\t@echo installing {name}\n"),
        )
        .unwrap();

        package.insert(&self.conn).unwrap();
    }

    /// Mark a package as installed at `version`
    pub fn mark_installed(&self, name: &str, version: &str) {
        Package::set_installed(&self.conn, name, true).unwrap();
        Package::set_installed_version(&self.conn, name, version).unwrap();
    }

    pub fn get(&self, name: &str) -> Package {
        Package::get(&self.conn, name).unwrap()
    }
}

/// Build a gzipped tarball containing `<top>/README` and `<top>/src/main.c`
pub fn source_tarball(top: &str) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder
        .append_data(&mut dir, format!("{top}/"), std::io::empty())
        .unwrap();

    for (path, content) in [
        ("README", b"read me\n".as_slice()),
        ("src/main.c", b"int main(void) { return 0; }\n".as_slice()),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, format!("{top}/{path}"), content)
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// One call made to a [`RecordingBuilder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCall {
    pub dir: PathBuf,
    /// Whether a Makefile was present in `dir` when the call was made
    pub had_makefile: bool,
}

/// Builder that records its calls instead of running make
///
/// Calls whose directory name starts with one of `failing` fail with a
/// build error.
#[derive(Default)]
pub struct RecordingBuilder {
    pub installs: RefCell<Vec<BuildCall>>,
    pub uninstalls: RefCell<Vec<BuildCall>>,
    pub failing: Vec<String>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Directory names of the install calls, in order
    pub fn installed_dirs(&self) -> Vec<String> {
        self.installs
            .borrow()
            .iter()
            .map(|call| dir_name(&call.dir))
            .collect()
    }

    fn record(&self, calls: &RefCell<Vec<BuildCall>>, dir: &Path, target: &str) -> Result<BuildOutput> {
        calls.borrow_mut().push(BuildCall {
            dir: dir.to_path_buf(),
            had_makefile: dir.join("Makefile").is_file(),
        });

        let name = dir_name(dir);
        if self.failing.iter().any(|f| name.starts_with(f.as_str())) {
            return Err(Error::BuildError {
                message: format!("make {target} failed with exit code 2"),
                output: format!("make: *** [{target}] Error 2 in {name}\n"),
            });
        }
        Ok(BuildOutput {
            output: format!("{target} {name}\n"),
        })
    }
}

impl Builder for RecordingBuilder {
    fn install(&self, dir: &Path) -> Result<BuildOutput> {
        self.record(&self.installs, dir, "install")
    }

    fn uninstall(&self, dir: &Path) -> Result<BuildOutput> {
        self.record(&self.uninstalls, dir, "uninstall")
    }
}

/// Progress tracker that keeps every event as a line of text
#[derive(Default)]
pub struct RecordingProgress {
    pub events: RefCell<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl ProgressTracker for RecordingProgress {
    fn phase(&self, position: BatchPosition, package: &str, _version: &str, phase: InstallPhase) {
        self.events
            .borrow_mut()
            .push(format!("{} {} {}", position, phase, package));
    }

    fn finished(&self, position: BatchPosition, package: &str) {
        self.events
            .borrow_mut()
            .push(format!("{} done {}", position, package));
    }

    fn failed(&self, position: BatchPosition, package: &str, _error: &str) {
        self.events
            .borrow_mut()
            .push(format!("{} failed {}", position, package));
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
