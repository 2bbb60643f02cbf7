// src/cli/catalog.rs
//! Catalog administration commands

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add a single package to the catalog
    Add {
        /// Package name
        #[arg(short, long)]
        name: String,

        /// Version published by the repository
        #[arg(short = 'V', long)]
        version: String,

        /// Package description
        #[arg(long)]
        description: Option<String>,

        /// Directory holding the package's Makefile (default: next to the catalog)
        #[arg(long)]
        build_dir: Option<String>,

        /// URL of the source archive (.tar.gz)
        #[arg(long)]
        archive_url: Option<String>,

        /// SHA-512 of the source archive
        #[arg(long)]
        sha512: Option<String>,

        /// Dependencies (comma-separated)
        #[arg(long, value_delimiter = ',')]
        deps: Vec<String>,
    },

    /// Add every package of a repo.json manifest
    Import {
        /// Manifest file
        file: PathBuf,
    },

    /// Change fields of a catalog entry
    Manage {
        /// Package name
        name: String,

        /// Rename the package (applied last)
        #[arg(long)]
        rename: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Mark as installed
        #[arg(long, conflicts_with = "uninstalled")]
        installed: bool,

        /// Mark as not installed
        #[arg(long)]
        uninstalled: bool,

        /// Set the installed version
        #[arg(long)]
        installed_version: Option<String>,

        /// Set the repository version
        #[arg(long)]
        repo_version: Option<String>,

        /// Set the build files directory
        #[arg(long)]
        build_dir: Option<String>,

        /// Set the archive URL
        #[arg(long)]
        archive_url: Option<String>,

        /// Set the archive SHA-512
        #[arg(long)]
        sha512: Option<String>,

        /// Replace the dependencies (comma-separated)
        #[arg(long, value_delimiter = ',')]
        deps: Option<Vec<String>>,

        /// Remove the package from the catalog (other changes are ignored)
        #[arg(long)]
        remove: bool,
    },

    /// Show one package
    Show {
        /// Package name
        name: String,
    },

    /// List catalog entries
    List {
        /// Only installed packages
        #[arg(short, long)]
        installed: bool,
    },

    /// Print a package's LICENSE file
    License {
        /// Package name
        name: String,
    },
}
