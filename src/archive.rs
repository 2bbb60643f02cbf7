// src/archive.rs

//! Source archive extraction
//!
//! Source archives are gzip-compressed tarballs whose first directory entry
//! is the source tree (`foo-1.2/`). Only directories and regular files are
//! recreated; PAX global headers are skipped and any other entry type is
//! rejected. A failure part-way through leaves whatever was already written.

use crate::db::models::BUILD_DESCRIPTOR;
use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::debug;

/// What [`untar`] wrote to disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArchive {
    /// First directory entry of the archive, joined under the destination
    pub top_level: Option<PathBuf>,
    /// Regular files written, in archive order
    pub files: Vec<PathBuf>,
}

/// Extract a `.tar.gz` file into `dest_dir`
pub fn untar(dest_dir: &Path, archive_path: &Path) -> Result<ExtractedArchive> {
    let file = File::open(archive_path).map_err(|e| {
        Error::ExtractError(format!("Failed to open {}: {e}", archive_path.display()))
    })?;
    untar_reader(dest_dir, file)
}

/// Extract a gzip-compressed tar stream into `dest_dir`
pub fn untar_reader<R: Read>(dest_dir: &Path, reader: R) -> Result<ExtractedArchive> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut extracted = ExtractedArchive::default();

    let entries = archive
        .entries()
        .map_err(|e| Error::ExtractError(format!("Failed to read archive entries: {e}")))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::ExtractError(format!("Failed to read archive entry: {e}")))?;

        let entry_type = entry.header().entry_type();
        if entry_type == EntryType::XGlobalHeader {
            continue;
        }

        let raw_path = entry
            .path()
            .map_err(|e| Error::ExtractError(format!("Failed to get entry path: {e}")))?
            .into_owned();
        let relative = sanitize_entry_path(&raw_path)?;
        // `./` roots the archive at the destination itself
        let target = if relative.as_os_str().is_empty() {
            dest_dir.to_path_buf()
        } else {
            dest_dir.join(&relative)
        };

        let mode = entry
            .header()
            .mode()
            .map_err(|e| Error::ExtractError(format!("Failed to get entry mode: {e}")))?;

        match entry_type {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| {
                    Error::ExtractError(format!("Failed to create {}: {e}", target.display()))
                })?;
                if target != dest_dir {
                    set_mode(&target, mode | 0o700)?;
                }
                if extracted.top_level.is_none() {
                    extracted.top_level = Some(target);
                }
            }
            EntryType::Regular | EntryType::Continuous => {
                if relative.as_os_str().is_empty() {
                    return Err(Error::ExtractError(format!(
                        "Archive file entry has an empty path: {}",
                        raw_path.display()
                    )));
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        Error::ExtractError(format!("Failed to create {}: {e}", parent.display()))
                    })?;
                }
                let mut out = File::create(&target).map_err(|e| {
                    Error::ExtractError(format!("Failed to create {}: {e}", target.display()))
                })?;
                io::copy(&mut entry, &mut out).map_err(|e| {
                    Error::ExtractError(format!("Failed to write {}: {e}", target.display()))
                })?;
                set_mode(&target, mode)?;
                extracted.files.push(target);
            }
            other => {
                return Err(Error::ExtractError(format!(
                    "Unsupported entry type {:?} for {}",
                    other,
                    raw_path.display()
                )));
            }
        }
    }

    debug!(
        "Extracted {} files into {}",
        extracted.files.len(),
        dest_dir.display()
    );
    Ok(extracted)
}

/// Reject absolute paths and `..` so entries stay under the destination
///
/// `.` components are dropped, so `./` itself comes back empty.
fn sanitize_entry_path(path: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::ExtractError(format!(
                    "Archive entry escapes the destination: {}",
                    path.display()
                )));
            }
        }
    }
    Ok(clean)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)).map_err(|e| {
        Error::ExtractError(format!("Failed to set mode on {}: {e}", path.display()))
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Copy `<build_files_dir>/Makefile` into `dest_dir`, overwriting
pub fn copy_build_descriptor(build_files_dir: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let source = build_files_dir.join(BUILD_DESCRIPTOR);
    let target = dest_dir.join(BUILD_DESCRIPTOR);
    fs::copy(&source, &target).map_err(|e| {
        Error::IoError(format!(
            "Failed to copy {} to {}: {e}",
            source.display(),
            target.display()
        ))
    })?;
    debug!("Copied {} to {}", source.display(), target.display());
    Ok(target)
}
