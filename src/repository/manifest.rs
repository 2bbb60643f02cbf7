// src/repository/manifest.rs

//! Repository manifest (`repo.json`) data structures
//!
//! ```json
//! { "packages": [ { "name": "foo", "version": "1.2", "dependencies": "bar baz" } ] }
//! ```
//!
//! Only `name` and `version` are required; every other field defaults to
//! an empty string, which the catalog treats as "not provided".

use crate::db::models::{Package, PackageFields};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest document listing the packages a repository publishes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub packages: Vec<ManifestEntry>,
}

/// One package entry in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub build_files_dir: String,
    #[serde(default)]
    pub archive_url: String,
    #[serde(default)]
    pub sha512: String,
    /// Whitespace-separated package names
    #[serde(default)]
    pub dependencies: String,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::ParseError(format!("Invalid repository manifest: {e}")))
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read manifest {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }
}

impl ManifestEntry {
    /// Build a fresh catalog record with defaults applied
    pub fn to_package(&self, db_path: &Path) -> Package {
        let mut package = Package::new(self.name.clone(), self.version.clone());
        package.description = self.description.clone();
        package.build_files_dir = self.build_files_dir.clone();
        package.archive_url = self.archive_url.clone();
        package.sha512 = self.sha512.clone();
        package.dependencies = self.dependencies.clone();
        package.apply_defaults(db_path);
        package
    }

    /// Fields for refreshing an existing record; blanks are filled from it
    pub fn merge_fields(&self, existing: &Package) -> PackageFields {
        fn or_existing(value: &str, existing: &str) -> String {
            if value.trim().is_empty() {
                existing.to_string()
            } else {
                value.to_string()
            }
        }

        PackageFields {
            description: or_existing(&self.description, &existing.description),
            repo_version: or_existing(&self.version, &existing.repo_version),
            build_files_dir: crate::db::paths::normalize_build_files_dir(&or_existing(
                &self.build_files_dir,
                &existing.build_files_dir,
            )),
            archive_url: or_existing(&self.archive_url, &existing.archive_url),
            sha512: or_existing(&self.sha512, &existing.sha512),
            dependencies: or_existing(&self.dependencies, &existing.dependencies),
        }
    }
}
