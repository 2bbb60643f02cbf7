// src/db/paths.rs
//! Centralized path derivation for catalog-relative directories

use std::path::{Path, PathBuf};

/// Get the directory containing the catalog
pub fn db_dir(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Default build files directory for a package: `<catalog dir>/<name>`
pub fn default_build_files_dir(db_path: &Path, name: &str) -> String {
    db_dir(db_path).join(name).to_string_lossy().into_owned()
}

/// Strip trailing path separators, keeping a lone `/` intact
pub fn normalize_build_files_dir(dir: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() && dir.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Resolve a build files directory: blank falls back to the catalog default
pub fn build_files_dir_or_default(dir: &str, db_path: &Path, name: &str) -> String {
    if dir.trim().is_empty() {
        default_build_files_dir(db_path, name)
    } else {
        normalize_build_files_dir(dir.trim())
    }
}
