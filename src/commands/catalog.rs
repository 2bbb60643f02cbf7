// src/commands/catalog.rs
//! Catalog administration commands

use super::open_catalog;
use anyhow::{Context, Result};
use srcpm::db::{self, models::Package};
use srcpm::repository::{Manifest, import_manifest};
use srcpm::{Config, preflight};
use std::path::Path;
use tracing::info;

/// Fields accepted by `catalog add`
#[derive(Debug, Default)]
pub struct NewPackage {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub build_dir: Option<String>,
    pub archive_url: Option<String>,
    pub sha512: Option<String>,
    pub deps: Vec<String>,
}

/// Changes accepted by `catalog manage`
#[derive(Debug, Default)]
pub struct PackageChanges {
    pub rename: Option<String>,
    pub description: Option<String>,
    pub installed: Option<bool>,
    pub installed_version: Option<String>,
    pub repo_version: Option<String>,
    pub build_dir: Option<String>,
    pub archive_url: Option<String>,
    pub sha512: Option<String>,
    pub deps: Option<Vec<String>>,
    pub remove: bool,
}

/// Add a single package record, creating the catalog if needed
pub fn cmd_catalog_add(config: &Config, new: NewPackage) -> Result<()> {
    preflight::require_root("add packages to the catalog")?;
    let conn = db::init(&config.db_path)
        .with_context(|| format!("Failed to open catalog {}", config.db_path.display()))?;

    let mut package = Package::new(&new.name, &new.version);
    package.description = new.description.unwrap_or_default();
    package.build_files_dir = new.build_dir.unwrap_or_default();
    package.archive_url = new.archive_url.unwrap_or_default();
    package.sha512 = new.sha512.unwrap_or_default();
    package.dependencies = new.deps.join(" ");
    package.apply_defaults(&config.db_path);

    package
        .insert(&conn)
        .with_context(|| format!("Failed to add {} to the catalog", new.name))?;

    info!("Added {} {} to {}", package.name, package.repo_version, config.db_path.display());
    println!("Added {}", package);
    Ok(())
}

/// Insert every entry of a manifest file
pub fn cmd_catalog_import(config: &Config, file: &Path) -> Result<()> {
    preflight::require_root("import packages")?;
    let manifest = Manifest::load(file)?;
    let conn = db::init(&config.db_path)
        .with_context(|| format!("Failed to open catalog {}", config.db_path.display()))?;

    let report = import_manifest(&conn, &config.db_path, &manifest, file.to_path_buf());
    println!(
        "Imported {} of {} package(s) from {}",
        report.inserted,
        manifest.packages.len(),
        file.display()
    );
    if !report.failed.is_empty() {
        eprintln!("warning: not imported: {}", report.failed.join(", "));
    }
    Ok(())
}

/// Edit one catalog record
pub fn cmd_catalog_manage(config: &Config, name: &str, changes: PackageChanges) -> Result<()> {
    preflight::require_root("modify the catalog")?;
    let conn = open_catalog(&config.db_path)?;

    // Fails with a clear message before any write
    Package::get(&conn, name)?;

    if changes.remove {
        Package::delete(&conn, name)?;
        println!("Removed {} from the catalog", name);
        return Ok(());
    }

    if let Some(description) = &changes.description {
        Package::set_description(&conn, name, description)?;
    }
    if let Some(installed) = changes.installed {
        Package::set_installed(&conn, name, installed)?;
    }
    if let Some(version) = &changes.installed_version {
        Package::set_installed_version(&conn, name, version)?;
    }
    if let Some(version) = &changes.repo_version {
        Package::set_repo_version(&conn, name, version)?;
    }
    if let Some(dir) = &changes.build_dir {
        Package::set_build_files_dir(&conn, name, dir)?;
    }
    if let Some(url) = &changes.archive_url {
        Package::set_archive_url(&conn, name, url)?;
    }
    if let Some(sha512) = &changes.sha512 {
        Package::set_hash(&conn, name, sha512)?;
    }
    if let Some(deps) = &changes.deps {
        Package::set_dependencies(&conn, name, &deps.join(" "))?;
    }

    let current = match &changes.rename {
        Some(new_name) => {
            Package::rename(&conn, name, new_name)
                .with_context(|| format!("Failed to rename {} to {}", name, new_name))?;
            new_name.as_str()
        }
        None => name,
    };

    println!("{}", Package::get(&conn, current)?);
    Ok(())
}

/// Show one package
pub fn cmd_catalog_show(config: &Config, name: &str) -> Result<()> {
    let conn = open_catalog(&config.db_path)?;
    let package = Package::get(&conn, name)?;

    println!("Package: {}", package.name);
    println!("Description: {}", package.description);
    println!("Repository version: {}", package.repo_version);
    if package.installed {
        println!("Installed: yes ({})", package.installed_version);
    } else {
        println!("Installed: no");
    }
    println!("Build files: {}", package.build_files_dir);
    if !package.archive_url.is_empty() {
        println!("Archive: {}", package.archive_url);
    }
    if !package.sha512.is_empty() {
        println!("SHA-512: {}", package.sha512);
    }
    let deps: Vec<&str> = package.dependency_names().collect();
    if !deps.is_empty() {
        println!("Dependencies: {}", deps.join(", "));
    }
    Ok(())
}

/// List catalog entries
pub fn cmd_catalog_list(config: &Config, installed_only: bool) -> Result<()> {
    let conn = open_catalog(&config.db_path)?;
    let packages = if installed_only {
        Package::list_installed(&conn)?
    } else {
        Package::list_all(&conn)?
    };

    if packages.is_empty() {
        println!("No packages found.");
        return Ok(());
    }
    for package in &packages {
        println!("{}", package);
    }
    Ok(())
}

/// Print a package's license
pub fn cmd_catalog_license(config: &Config, name: &str) -> Result<()> {
    let conn = open_catalog(&config.db_path)?;
    let package = Package::get(&conn, name)?;
    let license = package
        .read_license()
        .with_context(|| format!("{} has no readable license", name))?;
    print!("{}", license);
    Ok(())
}
