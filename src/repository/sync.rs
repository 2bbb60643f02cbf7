// src/repository/sync.rs

//! Catalog synchronization against a repository manifest
//!
//! A missing catalog is bootstrapped: every manifest entry becomes a fresh,
//! not-installed record. An existing catalog is reconciled: known packages
//! get their repository-side fields refreshed, unknown ones are skipped.
//! Installation state is never touched by a sync.

use crate::archive;
use crate::db::{self, models::Package, schema};
use crate::error::{Error, Result};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::client::RepositoryClient;
use super::manifest::Manifest;

/// File name of the manifest published at the root of a repository
pub const MANIFEST_FILE: &str = "repo.json";

/// Where the manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// A local `repo.json`
    File(PathBuf),
    /// A git-hosting coordinate such as `github.com/owner/repo`
    Remote { coordinate: String, name: String },
}

/// Options for [`sync_catalog`]
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Parent directory for downloaded repository build files
    pub state_dir: PathBuf,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(crate::config::DEFAULT_STATE_DIR),
        }
    }
}

/// Which path a sync took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Bootstrap,
    Reconcile,
}

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub manifest_path: PathBuf,
    /// Records created (bootstrap)
    pub inserted: usize,
    /// Records refreshed (reconcile)
    pub updated: usize,
    /// Entries not in the catalog (reconcile)
    pub skipped: Vec<String>,
    /// Entries whose write failed
    pub failed: Vec<String>,
}

impl SyncReport {
    fn new(mode: SyncMode, manifest_path: PathBuf) -> Self {
        Self {
            mode,
            manifest_path,
            inserted: 0,
            updated: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Base URL for a repository coordinate
///
/// A coordinate that already carries an `http://` or `https://` scheme is
/// used verbatim; anything else is served over https.
pub fn remote_base_url(coordinate: &str) -> String {
    let coordinate = coordinate.trim_end_matches('/');
    if coordinate.starts_with("http://") || coordinate.starts_with("https://") {
        coordinate.to_string()
    } else {
        format!("https://{coordinate}")
    }
}

/// URL of the build files archive `<base>/raw/main/<name>.tar.gz`
pub fn remote_archive_url(coordinate: &str, name: &str) -> String {
    format!("{}/raw/main/{}.tar.gz", remote_base_url(coordinate), name)
}

/// URL of the manifest `<base>/raw/main/repo.json`
pub fn remote_manifest_url(coordinate: &str) -> String {
    format!("{}/raw/main/{}", remote_base_url(coordinate), MANIFEST_FILE)
}

/// Download a remote repository's build files and manifest
///
/// Everything lands in `<state_dir>/<name>/`; the build files archive is
/// unpacked there. Returns the path of the downloaded manifest.
pub fn fetch_remote(coordinate: &str, name: &str, state_dir: &Path) -> Result<PathBuf> {
    let dest_dir = state_dir.join(name);
    fs::create_dir_all(&dest_dir).map_err(|e| {
        Error::IoError(format!(
            "Failed to create repository directory {}: {e}",
            dest_dir.display()
        ))
    })?;

    let client = RepositoryClient::new()?;

    let archive_path = dest_dir.join(format!("{name}.tar.gz"));
    client.download_file(&remote_archive_url(coordinate, name), &archive_path)?;

    let manifest_path = dest_dir.join(MANIFEST_FILE);
    client.download_file(&remote_manifest_url(coordinate), &manifest_path)?;

    let extracted = archive::untar(&dest_dir, &archive_path)?;
    info!(
        "Fetched repository '{}' ({} build files) into {}",
        name,
        extracted.files.len(),
        dest_dir.display()
    );

    Ok(manifest_path)
}

/// Synchronize the catalog at `db_path` with a manifest
pub fn sync_catalog(
    db_path: &Path,
    source: &ManifestSource,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let manifest_path = match source {
        ManifestSource::File(path) => path.clone(),
        ManifestSource::Remote { coordinate, name } => {
            fetch_remote(coordinate, name, &options.state_dir)?
        }
    };
    let manifest = Manifest::load(&manifest_path)?;

    // Must be checked before opening, which creates the file
    let bootstrap = !db::exists(db_path);

    let conn = db::open(db_path)?;
    schema::migrate(&conn)?;

    let report = if bootstrap {
        info!("No catalog at {}, bootstrapping", db_path.display());
        import_manifest(&conn, db_path, &manifest, manifest_path)
    } else {
        reconcile(&conn, &manifest, manifest_path)?
    };

    info!(
        "Sync complete: {} inserted, {} updated, {} skipped, {} failed",
        report.inserted,
        report.updated,
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Insert every manifest entry as a fresh record
///
/// Per-entry failures (a duplicate name, for instance) are logged and
/// recorded; the remaining entries are still inserted.
pub fn import_manifest(
    conn: &Connection,
    db_path: &Path,
    manifest: &Manifest,
    manifest_path: PathBuf,
) -> SyncReport {
    let mut report = SyncReport::new(SyncMode::Bootstrap, manifest_path);

    for entry in &manifest.packages {
        let package = entry.to_package(db_path);
        match package.insert(conn) {
            Ok(()) => {
                debug!("Added {} {} to the catalog", package.name, package.repo_version);
                report.inserted += 1;
            }
            Err(e) => {
                warn!("Unable to add {} to the catalog: {}", entry.name, e);
                report.failed.push(entry.name.clone());
            }
        }
    }

    report
}

fn reconcile(conn: &Connection, manifest: &Manifest, manifest_path: PathBuf) -> Result<SyncReport> {
    let mut report = SyncReport::new(SyncMode::Reconcile, manifest_path);

    for entry in &manifest.packages {
        let Some(existing) = Package::find(conn, &entry.name)? else {
            warn!(
                "Package {} is not in the catalog, skipping (sync only refreshes known packages)",
                entry.name
            );
            report.skipped.push(entry.name.clone());
            continue;
        };

        let fields = entry.merge_fields(&existing);
        match Package::refresh(conn, &entry.name, &fields) {
            Ok(()) => {
                debug!("Refreshed {} (repo version {})", entry.name, fields.repo_version);
                report.updated += 1;
            }
            Err(e) => {
                warn!("Unable to update {} in the catalog: {}", entry.name, e);
                report.failed.push(entry.name.clone());
            }
        }
    }

    Ok(report)
}
