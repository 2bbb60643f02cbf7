// src/commands/sync.rs
//! Catalog synchronization command

use anyhow::{Context, Result, bail};
use srcpm::repository::SyncMode;
use srcpm::{Config, ManifestSource, SyncOptions, preflight, sync_catalog};
use std::path::PathBuf;

/// Create or refresh the catalog from a manifest
///
/// With `--file` the manifest is read locally; otherwise the repository
/// coordinate comes from `--remote` or the configuration.
pub fn cmd_sync(
    config: &Config,
    file: Option<PathBuf>,
    remote: Option<String>,
    name: Option<String>,
) -> Result<()> {
    preflight::require_root("sync the catalog")?;

    let source = match file {
        Some(path) => ManifestSource::File(path),
        None => {
            let Some(coordinate) = remote.or_else(|| config.remote.clone()) else {
                bail!("No repository configured: pass --remote or --file, or set `remote` in the config file");
            };
            ManifestSource::Remote {
                coordinate,
                name: name.unwrap_or_else(|| config.repo_name.clone()),
            }
        }
    };

    let options = SyncOptions {
        state_dir: config.state_dir.clone(),
    };
    let report = sync_catalog(&config.db_path, &source, &options)
        .with_context(|| format!("Failed to sync catalog {}", config.db_path.display()))?;

    match report.mode {
        SyncMode::Bootstrap => println!(
            "Created catalog {} with {} package(s)",
            config.db_path.display(),
            report.inserted
        ),
        SyncMode::Reconcile => println!("Updated {} package(s)", report.updated),
    }

    for name in &report.skipped {
        println!("Skipped {}: not in the catalog (add it with `srcpm catalog add`)", name);
    }
    if !report.failed.is_empty() {
        eprintln!(
            "warning: {} package(s) could not be written: {}",
            report.failed.len(),
            report.failed.join(", ")
        );
    }

    Ok(())
}
