// src/commands/mod.rs
//! Command handlers for the srcpm CLI

mod catalog;
mod install;
pub mod progress;
mod sync;

use anyhow::{Result, bail};
use rusqlite::Connection;
use srcpm::db::{self, schema};
use std::path::Path;

// Re-export all command handlers
pub use catalog::{
    NewPackage, PackageChanges, cmd_catalog_add, cmd_catalog_import, cmd_catalog_license,
    cmd_catalog_list, cmd_catalog_manage, cmd_catalog_show,
};
pub use install::{PackageFlags, cmd_install, cmd_uninstall, cmd_update};
pub use sync::cmd_sync;

/// Open an existing catalog, bringing its schema up to date
///
/// Unlike `db::open`, a missing catalog is an error rather than a new
/// empty file.
fn open_catalog(db_path: &Path) -> Result<Connection> {
    if !db::exists(db_path) {
        bail!(
            "No catalog at {}. Run `srcpm sync` or `srcpm catalog import` first",
            db_path.display()
        );
    }
    let conn = db::open(db_path)?;
    schema::migrate(&conn)?;
    Ok(conn)
}
