// src/resolver/mod.rs

//! Recursive dependency resolution
//!
//! Dependencies are plain package names; there are no version constraints.
//! Resolution walks the catalog depth-first and appends each dependency to
//! the [`MarkedSet`] after its own dependencies, so the set is always in a
//! valid build order. Installed packages are not revisited.

use crate::db::models::Package;
use crate::error::Result;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ordered, de-duplicated list of packages selected for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedSet {
    names: Vec<String>,
}

impl MarkedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless it is already marked; returns whether it was added
    pub fn mark(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

/// A dependency that names a package the catalog does not know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub dependent: String,
    pub name: String,
}

/// What a resolution pass could not satisfy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub missing: Vec<MissingDependency>,
}

/// Depth-first resolver over the package catalog
pub struct Resolver<'a> {
    conn: &'a Connection,
    /// Packages whose dependencies are currently being walked
    in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            in_progress: HashSet::new(),
        }
    }

    /// Mark every not-yet-installed dependency of `dependent`, dependencies first
    ///
    /// `dependencies` is the raw whitespace-separated list. The dependent
    /// itself is not marked; the caller appends it afterwards.
    pub fn resolve(
        &mut self,
        dependent: &str,
        dependencies: &str,
        marked: &mut MarkedSet,
    ) -> Result<ResolveReport> {
        let mut report = ResolveReport::default();
        self.resolve_inner(dependent, dependencies, marked, &mut report)?;
        Ok(report)
    }

    fn resolve_inner(
        &mut self,
        dependent: &str,
        dependencies: &str,
        marked: &mut MarkedSet,
        report: &mut ResolveReport,
    ) -> Result<()> {
        self.in_progress.insert(dependent.to_string());

        let result = self.resolve_each(dependent, dependencies, marked, report);

        self.in_progress.remove(dependent);
        result
    }

    fn resolve_each(
        &mut self,
        dependent: &str,
        dependencies: &str,
        marked: &mut MarkedSet,
        report: &mut ResolveReport,
    ) -> Result<()> {
        for name in dependencies.split_whitespace() {
            let Some(package) = Package::find(self.conn, name)? else {
                warn!(
                    "{} depends on {}, which is not in the catalog; skipping it",
                    dependent, name
                );
                report.missing.push(MissingDependency {
                    dependent: dependent.to_string(),
                    name: name.to_string(),
                });
                continue;
            };

            if package.installed {
                debug!("Dependency {} of {} is already installed", name, dependent);
                continue;
            }
            if marked.contains(name) {
                continue;
            }
            if self.in_progress.contains(name) {
                debug!("Dependency cycle through {} and {}", dependent, name);
                continue;
            }

            self.resolve_inner(name, &package.dependencies, marked, report)?;
            debug!("Marking {} (needed by {})", name, dependent);
            marked.mark(name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn add(conn: &Connection, name: &str, deps: &str) {
        let mut pkg = Package::new(name, "1.0");
        pkg.build_files_dir = format!("/srv/{name}");
        pkg.dependencies = deps.to_string();
        pkg.insert(conn).unwrap();
    }

    /// Resolve `root` the way the batch runner does: dependencies, then itself
    fn resolve_root(conn: &Connection, root: &str) -> (Vec<String>, ResolveReport) {
        let pkg = Package::get(conn, root).unwrap();
        let mut marked = MarkedSet::new();
        let report = Resolver::new(conn)
            .resolve(root, &pkg.dependencies, &mut marked)
            .unwrap();
        marked.mark(root);
        (marked.into_vec(), report)
    }

    #[test]
    fn test_marked_set_deduplicates() {
        let mut marked = MarkedSet::new();
        assert!(marked.mark("a"));
        assert!(marked.mark("b"));
        assert!(!marked.mark("a"));
        assert_eq!(marked.len(), 2);
        assert_eq!(marked.into_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_dependencies() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "");
        add(&conn, "b", "   \t ");

        assert_eq!(resolve_root(&conn, "a").0, vec!["a"]);
        assert_eq!(resolve_root(&conn, "b").0, vec!["b"]);
    }

    #[test]
    fn test_chain_resolves_leaf_first() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "b");
        add(&conn, "b", "c");
        add(&conn, "c", "");

        assert_eq!(resolve_root(&conn, "a").0, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_shared_dependency_marked_once() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "b c");
        add(&conn, "b", "d");
        add(&conn, "c", "d");
        add(&conn, "d", "");

        assert_eq!(resolve_root(&conn, "a").0, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_installed_dependency_skipped() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "b");
        add(&conn, "b", "c");
        add(&conn, "c", "");
        Package::set_installed(&conn, "b", true).unwrap();

        assert_eq!(resolve_root(&conn, "a").0, vec!["a"]);
    }

    #[test]
    fn test_missing_dependency_reported() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "ghost b");
        add(&conn, "b", "");

        let (order, report) = resolve_root(&conn, "a");
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(
            report.missing,
            vec![MissingDependency {
                dependent: "a".to_string(),
                name: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "b");
        add(&conn, "b", "a");

        assert_eq!(resolve_root(&conn, "a").0, vec!["b", "a"]);
    }

    #[test]
    fn test_self_dependency_terminates() {
        let (_temp, conn) = create_test_db();
        add(&conn, "a", "a");

        assert_eq!(resolve_root(&conn, "a").0, vec!["a"]);
    }
}
