// src/db/schema.rs

//! Catalog schema
//!
//! The catalog is a single `packages` table. [`migrate`] only creates what
//! is absent, so it is safe to call on every open and adopts catalogs
//! written by other tools as long as they use the same columns.

use crate::error::Result;
use rusqlite::Connection;
use tracing::debug;

/// Create the `packages` table and its index if they do not exist yet
pub fn migrate(conn: &Connection) -> Result<()> {
    debug!("Ensuring catalog schema");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS packages (
            name TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            repo_version TEXT NOT NULL,
            installed_version TEXT NOT NULL DEFAULT '',
            installed INTEGER NOT NULL DEFAULT 0,
            build_files_dir TEXT NOT NULL,
            archive_url TEXT NOT NULL DEFAULT '',
            sha512 TEXT NOT NULL DEFAULT '',
            dependencies TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_packages_installed ON packages(installed);
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_migrate_creates_only_packages() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(table_names(&conn), vec!["packages".to_string()]);
    }

    #[test]
    fn test_migrate_keeps_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO packages (name, description, repo_version, build_files_dir)
             VALUES ('foo', '', '1.0', '/tmp/foo')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
