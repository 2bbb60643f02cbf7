// src/repository/mod.rs

//! Remote repositories: downloads, manifests and catalog synchronization

mod client;
mod manifest;
mod sync;

pub use client::RepositoryClient;
pub use manifest::{Manifest, ManifestEntry};
pub use sync::{
    MANIFEST_FILE, ManifestSource, SyncMode, SyncOptions, SyncReport, fetch_remote,
    import_manifest, remote_archive_url, remote_base_url, remote_manifest_url, sync_catalog,
};
