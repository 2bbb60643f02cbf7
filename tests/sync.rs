// tests/sync.rs

//! Integration tests for catalog bootstrap and reconciliation.

mod common;

use common::{TestCatalog, source_tarball};
use httpmock::prelude::*;
use srcpm::db::models::{NO_DESCRIPTION, Package};
use srcpm::repository::SyncMode;
use srcpm::{ManifestSource, SyncOptions, db, sync_catalog};
use std::fs;
use std::path::Path;

const MANIFEST: &str = r#"{
  "packages": [
    { "name": "foo", "version": "1.2", "description": "Foo tool", "dependencies": "bar",
      "archiveUrl": "https://example.com/foo-1.2.tar.gz", "sha512": "aa11" },
    { "name": "bar", "version": "0.9", "buildFilesDir": "/srv/build/bar/" }
  ]
}"#;

fn write_manifest(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("repo.json");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_bootstrap_creates_one_row_per_entry() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(temp.path(), MANIFEST);
    let db_path = temp.path().join("main").join("main.db");

    let report = sync_catalog(
        &db_path,
        &ManifestSource::File(manifest),
        &SyncOptions::default(),
    )
    .unwrap();

    assert_eq!(report.mode, SyncMode::Bootstrap);
    assert_eq!(report.inserted, 2);

    let conn = db::open(&db_path).unwrap();
    let all = Package::list_all(&conn).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|p| !p.installed && p.installed_version.is_empty()));

    let foo = Package::get(&conn, "foo").unwrap();
    assert_eq!(foo.repo_version, "1.2");
    assert_eq!(foo.dependencies, "bar");
    assert_eq!(
        foo.build_files_dir,
        temp.path().join("main").join("foo").to_string_lossy()
    );

    let bar = Package::get(&conn, "bar").unwrap();
    assert_eq!(bar.description, NO_DESCRIPTION);
    assert_eq!(bar.build_files_dir, "/srv/build/bar");
}

#[test]
fn test_reconcile_keeps_populated_fields() {
    let catalog = TestCatalog::new();
    catalog.add_package("foo", "1.0", "https://old.example.com/foo.tar.gz", "old", "");
    catalog.mark_installed("foo", "1.0");

    let manifest = write_manifest(
        catalog.temp_dir.path(),
        r#"{ "packages": [
            { "name": "foo", "version": "1.1", "sha512": "new" },
            { "name": "ghost", "version": "9.9" }
        ] }"#,
    );

    let report = sync_catalog(
        &catalog.db_path,
        &ManifestSource::File(manifest),
        &SyncOptions::default(),
    )
    .unwrap();

    assert_eq!(report.mode, SyncMode::Reconcile);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, vec!["ghost".to_string()]);

    let foo = catalog.get("foo");
    assert_eq!(foo.repo_version, "1.1");
    assert_eq!(foo.sha512, "new");
    assert_eq!(foo.archive_url, "https://old.example.com/foo.tar.gz");
    // Installation state is left alone
    assert!(foo.installed);
    assert_eq!(foo.installed_version, "1.0");

    assert!(Package::find(&catalog.conn, "ghost").unwrap().is_none());
}

#[test]
fn test_invalid_manifest_leaves_catalog_absent() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(temp.path(), "{ not json");
    let db_path = temp.path().join("main.db");

    let result = sync_catalog(
        &db_path,
        &ManifestSource::File(manifest),
        &SyncOptions::default(),
    );

    assert!(matches!(result, Err(srcpm::Error::ParseError(_))));
    assert!(!db_path.exists());
}

#[test]
fn test_remote_sync_downloads_build_files() {
    let server = MockServer::start();
    let build_files = source_tarball("foo");
    let archive_mock = server.mock(|when, then| {
        when.method(GET).path("/owner/pkgs/raw/main/main.tar.gz");
        then.status(200).body(&build_files);
    });
    let manifest_mock = server.mock(|when, then| {
        when.method(GET).path("/owner/pkgs/raw/main/repo.json");
        then.status(200).body(MANIFEST);
    });

    let temp = tempfile::tempdir().unwrap();
    let state_dir = temp.path().join("state");
    let db_path = state_dir.join("main").join("main.db");

    let source = ManifestSource::Remote {
        coordinate: server.url("/owner/pkgs"),
        name: "main".to_string(),
    };
    let options = SyncOptions {
        state_dir: state_dir.clone(),
    };
    let report = sync_catalog(&db_path, &source, &options).unwrap();

    archive_mock.assert();
    manifest_mock.assert();
    assert_eq!(report.mode, SyncMode::Bootstrap);
    assert_eq!(report.manifest_path, state_dir.join("main").join("repo.json"));
    assert!(state_dir.join("main").join("foo").join("README").is_file());

    // Default build directories land next to the catalog, where the
    // build files were unpacked
    let conn = db::open(&db_path).unwrap();
    let foo = Package::get(&conn, "foo").unwrap();
    assert!(Path::new(&foo.build_files_dir).join("README").is_file());
}
