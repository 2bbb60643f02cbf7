// src/lib.rs

//! srcpm - a source-based package manager
//!
//! Packages are listed in a local SQLite catalog and built from source:
//! the source archive is downloaded, checked against its published SHA-512,
//! unpacked, and installed with the package's own `Makefile`.
//!
//! # Architecture
//!
//! - Catalog: one `packages` row per name, installed state included
//! - Resolver: dependencies are bare names, marked leaf-first
//! - Pipeline: download, verify, extract, build, record, clean
//! - Batch: classification, confirmation and in-order processing
//! - Sync: catalog bootstrap or refresh from a `repo.json` manifest

pub mod archive;
pub mod batch;
pub mod builder;
pub mod config;
pub mod db;
mod error;
pub mod hash;
pub mod pipeline;
pub mod preflight;
pub mod progress;
pub mod prompt;
pub mod repository;
pub mod resolver;

pub use batch::{
    BatchOptions, BatchReport, BatchRunner, BatchStatus, Classification, Operation,
};
pub use builder::{BuildOutput, Builder, MakeBuilder};
pub use config::Config;
pub use db::models::{Package, PackageFields};
pub use error::{Error, Result};
pub use pipeline::{InstallOutcome, InstallPhase, Pipeline, PipelineOptions};
pub use progress::{BatchPosition, LogProgress, ProgressTracker, SilentProgress};
pub use prompt::{AutoConfirm, Confirm, LinePrompt};
pub use repository::{ManifestSource, SyncOptions, SyncReport, sync_catalog};
pub use resolver::{MarkedSet, Resolver};
