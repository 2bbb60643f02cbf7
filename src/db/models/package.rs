// src/db/models/package.rs

//! Package model - one catalog row per installable source package

use crate::db::paths;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;
use std::path::Path;

/// Description stored when none was provided
pub const NO_DESCRIPTION: &str = "[No description provided for this package.]";

/// Build descriptor file expected in every build files directory
pub const BUILD_DESCRIPTOR: &str = "Makefile";

/// License file read by `catalog license`
pub const LICENSE_FILE: &str = "LICENSE";

const SELECT_COLUMNS: &str = "SELECT name, description, repo_version, installed_version, installed,
            build_files_dir, archive_url, sha512, dependencies
     FROM packages";

/// A package record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub description: String,
    pub repo_version: String,
    pub installed_version: String,
    pub installed: bool,
    pub build_files_dir: String,
    pub archive_url: String,
    pub sha512: String,
    /// Whitespace-separated package names
    pub dependencies: String,
}

/// Field values applied by [`Package::refresh`]
///
/// Empty strings mean "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFields {
    pub description: String,
    pub repo_version: String,
    pub build_files_dir: String,
    pub archive_url: String,
    pub sha512: String,
    pub dependencies: String,
}

impl Package {
    /// Create a new, not-installed package record
    pub fn new(name: impl Into<String>, repo_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: NO_DESCRIPTION.to_string(),
            repo_version: repo_version.into(),
            installed_version: String::new(),
            installed: false,
            build_files_dir: String::new(),
            archive_url: String::new(),
            sha512: String::new(),
            dependencies: String::new(),
        }
    }

    /// Fill in catalog defaults: placeholder description, build files
    /// directory under the catalog directory, no trailing separator
    pub fn apply_defaults(&mut self, db_path: &Path) {
        if self.description.trim().is_empty() {
            self.description = NO_DESCRIPTION.to_string();
        }
        self.build_files_dir =
            paths::build_files_dir_or_default(&self.build_files_dir, db_path, &self.name);
    }

    /// Insert this package as a fresh, not-installed record
    ///
    /// `installed` and `installed_version` are always written as false and
    /// empty, whatever the struct holds.
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO packages (name, description, repo_version, installed_version, installed,
                                   build_files_dir, archive_url, sha512, dependencies)
             VALUES (?1, ?2, ?3, '', 0, ?4, ?5, ?6, ?7)",
            params![
                &self.name,
                &self.description,
                &self.repo_version,
                &self.build_files_dir,
                &self.archive_url,
                &self.sha512,
                &self.dependencies,
            ],
        )?;
        Ok(())
    }

    /// Overwrite the synchronizable fields of an existing record
    ///
    /// Only non-empty fields are written; an empty field keeps the stored
    /// value.
    pub fn refresh(conn: &Connection, name: &str, fields: &PackageFields) -> Result<()> {
        let rows = conn.execute(
            "UPDATE packages SET
                description = COALESCE(NULLIF(?2, ''), description),
                repo_version = COALESCE(NULLIF(?3, ''), repo_version),
                build_files_dir = COALESCE(NULLIF(?4, ''), build_files_dir),
                archive_url = COALESCE(NULLIF(?5, ''), archive_url),
                sha512 = COALESCE(NULLIF(?6, ''), sha512),
                dependencies = COALESCE(NULLIF(?7, ''), dependencies)
             WHERE name = ?1",
            params![
                name,
                &fields.description,
                &fields.repo_version,
                &fields.build_files_dir,
                &fields.archive_url,
                &fields.sha512,
                &fields.dependencies,
            ],
        )?;
        require_row(rows, name)
    }

    /// Find a package by name
    pub fn find(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE name = ?1"))?;
        let package = stmt.query_row([name], Self::from_row).optional()?;
        Ok(package)
    }

    /// Get a package by name, failing when it is not in the catalog
    pub fn get(conn: &Connection, name: &str) -> Result<Self> {
        Self::find(conn, name)?.ok_or_else(|| not_found(name))
    }

    /// List every package, ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY name"))?;
        let packages = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// List installed packages, ordered by name
    pub fn list_installed(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE installed = 1 ORDER BY name"))?;
        let packages = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Installed packages whose installed version differs from the repository version
    pub fn list_outdated(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE installed = 1 AND installed_version != repo_version ORDER BY name"
        ))?;
        let packages = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Whether a package with this name is in the catalog
    pub fn exists(conn: &Connection, name: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM packages WHERE name = ?1", [name], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Whether the named package is installed
    pub fn is_installed(conn: &Connection, name: &str) -> Result<bool> {
        let installed: Option<i32> = conn
            .query_row("SELECT installed FROM packages WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        installed.map(|v| v != 0).ok_or_else(|| not_found(name))
    }

    pub fn set_installed(conn: &Connection, name: &str, installed: bool) -> Result<()> {
        let rows = conn.execute(
            "UPDATE packages SET installed = ?1 WHERE name = ?2",
            params![installed as i32, name],
        )?;
        require_row(rows, name)
    }

    pub fn set_installed_version(conn: &Connection, name: &str, version: &str) -> Result<()> {
        set_text(conn, "installed_version", name, version)
    }

    pub fn set_repo_version(conn: &Connection, name: &str, version: &str) -> Result<()> {
        set_text(conn, "repo_version", name, version)
    }

    pub fn set_description(conn: &Connection, name: &str, description: &str) -> Result<()> {
        set_text(conn, "description", name, description)
    }

    /// Set the build files directory, stripping any trailing separator
    pub fn set_build_files_dir(conn: &Connection, name: &str, dir: &str) -> Result<()> {
        set_text(
            conn,
            "build_files_dir",
            name,
            &paths::normalize_build_files_dir(dir),
        )
    }

    pub fn set_archive_url(conn: &Connection, name: &str, url: &str) -> Result<()> {
        set_text(conn, "archive_url", name, url)
    }

    pub fn set_hash(conn: &Connection, name: &str, sha512: &str) -> Result<()> {
        set_text(conn, "sha512", name, sha512)
    }

    pub fn set_dependencies(conn: &Connection, name: &str, dependencies: &str) -> Result<()> {
        set_text(conn, "dependencies", name, dependencies)
    }

    /// Change a package's primary key
    pub fn rename(conn: &Connection, old_name: &str, new_name: &str) -> Result<()> {
        let rows = conn.execute(
            "UPDATE packages SET name = ?1 WHERE name = ?2",
            params![new_name, old_name],
        )?;
        require_row(rows, old_name)
    }

    /// Remove a package record
    pub fn delete(conn: &Connection, name: &str) -> Result<()> {
        let rows = conn.execute("DELETE FROM packages WHERE name = ?1", [name])?;
        require_row(rows, name)
    }

    /// Declared dependency names
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.split_whitespace()
    }

    /// Read `<build_files_dir>/LICENSE`
    pub fn read_license(&self) -> Result<String> {
        let path = Path::new(&self.build_files_dir).join(LICENSE_FILE);
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFoundError(format!("No license file at {}", path.display()))
            } else {
                Error::IoError(format!("Failed to read {}: {e}", path.display()))
            }
        })
    }

    /// Convert a database row to a Package
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            description: row.get(1)?,
            repo_version: row.get(2)?,
            installed_version: row.get(3)?,
            installed: row.get::<_, i32>(4)? != 0,
            build_files_dir: row.get(5)?,
            archive_url: row.get(6)?,
            sha512: row.get(7)?,
            dependencies: row.get(8)?,
        })
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.installed {
            write!(f, "{} [Installed ({})]", self.name, self.installed_version)?;
        } else {
            write!(f, "{} [Not installed]", self.name)?;
        }
        write!(
            f,
            "\t- {}\t- Repo's version: {}",
            self.description, self.repo_version
        )
    }
}

fn not_found(name: &str) -> Error {
    Error::NotFoundError(format!("Package '{}' is not in the catalog", name))
}

fn require_row(rows: usize, name: &str) -> Result<()> {
    if rows == 0 {
        Err(not_found(name))
    } else {
        Ok(())
    }
}

/// Single-column text update; `column` is always one of the fixed names above
fn set_text(conn: &Connection, column: &str, name: &str, value: &str) -> Result<()> {
    let rows = conn.execute(
        &format!("UPDATE packages SET {column} = ?1 WHERE name = ?2"),
        params![value, name],
    )?;
    require_row(rows, name)
}
