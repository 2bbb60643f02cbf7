// src/db/mod.rs

//! Package catalog storage
//!
//! The catalog is a single SQLite file holding one row per package. A
//! connection is opened once per invocation and dropped when the command
//! finishes.

pub mod models;
pub mod paths;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Whether a catalog file is already present on disk
pub fn exists(db_path: impl AsRef<Path>) -> bool {
    db_path.as_ref().is_file()
}

/// Open a connection to the catalog
///
/// SQLite creates the file if it does not exist yet; callers that need to
/// know whether the catalog existed must check [`exists`] first.
pub fn open(db_path: impl AsRef<Path>) -> Result<Connection> {
    let db_path = db_path.as_ref();
    debug!("Opening catalog at {}", db_path.display());

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::InitError(format!(
                "Failed to create catalog directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let conn = Connection::open(db_path).map_err(|e| {
        Error::InitError(format!("Failed to open catalog {}: {e}", db_path.display()))
    })?;
    Ok(conn)
}

/// Open the catalog and make sure the schema exists
pub fn init(db_path: impl AsRef<Path>) -> Result<Connection> {
    let conn = open(&db_path)?;
    schema::migrate(&conn)?;
    info!("Catalog ready at {}", db_path.as_ref().display());
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_file_and_schema() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("nested/main.db");
        assert!(!exists(&db_path));

        let conn = init(&db_path).unwrap();
        assert!(exists(&db_path));

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'packages'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
