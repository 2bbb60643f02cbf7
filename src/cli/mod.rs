// src/cli/mod.rs
//! CLI definitions for srcpm
//!
//! Package commands (`install`, `uninstall`, `update`) and `sync` sit at
//! the root; catalog administration lives under `catalog`. Package lists
//! accept both separate arguments and comma-separated values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod catalog;

pub use catalog::CatalogCommands;

#[derive(Parser)]
#[command(name = "srcpm")]
#[command(author = "srcpm Contributors")]
#[command(version)]
#[command(about = "Source-based package manager: build and install packages from a catalog", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $SRCPM_CONFIG or /etc/srcpm/srcpm.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the catalog database
    #[arg(short, long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Show build output and info-level logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and install package(s) and their dependencies
    Install {
        /// Package names (comma-separated values accepted)
        #[arg(required = true, value_delimiter = ',')]
        packages: Vec<String>,

        /// Reinstall installed packages and skip archive verification
        #[arg(short, long)]
        force: bool,

        /// Keep the extracted sources under the source directory
        #[arg(short, long)]
        keep: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Do not resolve dependencies
        #[arg(long)]
        no_deps: bool,
    },

    /// Uninstall package(s) with their `make uninstall` target
    Uninstall {
        /// Package names (comma-separated values accepted)
        #[arg(required = true, value_delimiter = ',')]
        packages: Vec<String>,

        /// Keep previously kept sources
        #[arg(short, long)]
        keep: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Rebuild installed packages whose catalog version changed
    Update {
        /// Package names (comma-separated values accepted)
        #[arg(value_delimiter = ',')]
        packages: Vec<String>,

        /// Update every outdated package
        #[arg(short, long)]
        all: bool,

        /// Only list available updates
        #[arg(short, long)]
        check: bool,

        /// Skip archive verification
        #[arg(short, long)]
        force: bool,

        /// Keep the extracted sources under the source directory
        #[arg(short, long)]
        keep: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Create or refresh the catalog from a repository manifest
    Sync {
        /// Local repo.json to import instead of downloading one
        #[arg(long, value_name = "PATH", conflicts_with = "remote")]
        file: Option<PathBuf>,

        /// Repository coordinate, e.g. github.com/owner/packages
        #[arg(long)]
        remote: Option<String>,

        /// Repository name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Catalog administration
    #[command(subcommand)]
    Catalog(CatalogCommands),
}
