//! Concurrent, deduplicating type catalog.
//!
//! The catalog is loaded exactly once, before any resolution: every unique
//! source location is loaded on its own scoped thread, results are funneled
//! through a channel, and all workers are joined before the catalog is
//! returned. The result is an immutable snapshot; lookups after the load need
//! no synchronization.

use crate::error::LoadError;
use crate::location::SourceLocation;
use crate::parser;
use crate::records::{PackageFile, PackageScope};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::thread;

/// Immutable snapshot of all loaded package scopes, keyed by source location.
#[derive(Debug)]
pub struct TypeCatalog {
    scopes: HashMap<String, PackageScope>,
}

impl TypeCatalog {
    /// Loads all unique locations concurrently and returns the catalog.
    ///
    /// Duplicate locations (equal keys) are loaded once. The first worker
    /// error aborts the load; all workers are joined before returning either
    /// way.
    ///
    /// # Errors
    /// Returns the first `LoadError` reported by any worker.
    pub fn load(locations: &[SourceLocation]) -> Result<Self, LoadError> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for location in locations {
            if seen.insert(location.key()) {
                unique.push(location);
            }
        }

        let (tx, rx) = crossbeam_channel::bounded(unique.len());
        thread::scope(|scope| {
            for location in &unique {
                let tx = tx.clone();
                scope.spawn(move || {
                    let result = load_location(location);
                    // The channel has capacity for every worker; send cannot
                    // block and the receiver outlives the scope.
                    let _ = tx.send((location.key(), result));
                });
            }
        });
        drop(tx);

        let mut scopes = HashMap::new();
        let mut first_error = None;
        for (key, result) in rx {
            match result {
                Ok(package) => {
                    tracing::debug!(key, package = %package.name, records = package.len(), "loaded package scope");
                    scopes.insert(key, package);
                }
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(Self { scopes }),
        }
    }

    /// Looks up the loaded scope for a location.
    #[must_use]
    pub fn lookup(&self, location: &SourceLocation) -> Option<&PackageScope> {
        self.scopes.get(&location.key())
    }

    /// Number of loaded scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Loads and merges all schema files at one location into a single scope.
fn load_location(location: &SourceLocation) -> Result<PackageScope, LoadError> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(&location.dir)
        .map_err(|e| LoadError::io(location.dir.clone(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(location.dir.clone(), e))?;
        let path = entry.path();
        if is_schema_file(&path, location.include_tests) {
            files.push(path);
        }
    }
    // Directory iteration order is platform-dependent; sort for a
    // deterministic merge order.
    files.sort();

    let mut packages: BTreeMap<String, PackageScope> = BTreeMap::new();
    for file in files {
        let xml = std::fs::read_to_string(&file).map_err(|e| LoadError::io(file.clone(), e))?;
        let parsed = parser::parse_package(&xml).map_err(|source| LoadError::Schema {
            file: file.clone(),
            source,
        })?;
        merge_file(&mut packages, parsed)?;
    }

    select_package(packages, location)
}

fn is_schema_file(path: &Path, include_tests: bool) -> bool {
    if path.extension().is_none_or(|ext| ext != "xml") {
        return false;
    }
    if include_tests {
        return true;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_none_or(|stem| !stem.ends_with("_test"))
}

fn merge_file(
    packages: &mut BTreeMap<String, PackageScope>,
    file: PackageFile,
) -> Result<(), LoadError> {
    let scope = packages
        .entry(file.package.clone())
        .or_insert_with(|| PackageScope::new(file.package.clone(), file.module.clone()));
    for record in file.records {
        let name = record.name.clone();
        if !scope.add_record(record) {
            return Err(LoadError::DuplicateRecord {
                package: file.package,
                record: name,
            });
        }
    }
    Ok(())
}

/// Applies the package tie-break: a lone package is always accepted; with
/// several candidates a configured selector filters by name, and anything
/// other than exactly one survivor fails.
fn select_package(
    packages: BTreeMap<String, PackageScope>,
    location: &SourceLocation,
) -> Result<PackageScope, LoadError> {
    let mut candidates: Vec<PackageScope> = packages.into_values().collect();

    if candidates.len() != 1 {
        if let Some(selector) = &location.package {
            candidates.retain(|p| &p.name == selector);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(LoadError::NoPackage {
            location: location.to_string(),
        }),
        count => Err(LoadError::AmbiguousPackage {
            location: location.to_string(),
            count,
            found: candidates
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_schema(dir: &std::path::Path, file: &str, package: &str, record: &str) {
        let xml = format!(
            r#"<recordSchema package="{package}" module="example.com/{package}">
    <record name="{record}">
        <field name="Name" type="string"/>
    </record>
</recordSchema>"#
        );
        fs::write(dir.join(file), xml).expect("Failed to write schema file");
    }

    #[test]
    fn test_load_single_package() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "models.xml", "models", "Person");

        let location = SourceLocation::new(dir.path());
        let catalog = TypeCatalog::load(&[location.clone()]).expect("Failed to load catalog");

        let scope = catalog.lookup(&location).expect("missing scope");
        assert_eq!(scope.name, "models");
        assert!(scope.record("Person").is_some());
    }

    #[test]
    fn test_load_merges_files_of_same_package() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "a.xml", "models", "Person");
        write_schema(dir.path(), "b.xml", "models", "Order");

        let location = SourceLocation::new(dir.path());
        let catalog = TypeCatalog::load(&[location.clone()]).expect("Failed to load catalog");
        let scope = catalog.lookup(&location).expect("missing scope");

        assert!(scope.record("Person").is_some());
        assert!(scope.record("Order").is_some());
    }

    #[test]
    fn test_load_deduplicates_locations() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "models.xml", "models", "Person");

        let location = SourceLocation::new(dir.path());
        let catalog = TypeCatalog::load(&[location.clone(), location.clone(), location.clone()])
            .expect("Failed to load catalog");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_ambiguous_without_selector() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "a.xml", "models", "Person");
        write_schema(dir.path(), "b.xml", "other", "Widget");

        let location = SourceLocation::new(dir.path());
        let result = TypeCatalog::load(&[location]);
        assert!(matches!(result, Err(LoadError::AmbiguousPackage { .. })));
    }

    #[test]
    fn test_load_selector_picks_package() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "a.xml", "models", "Person");
        write_schema(dir.path(), "b.xml", "other", "Widget");

        let location = SourceLocation::new(dir.path()).with_package("other");
        let catalog = TypeCatalog::load(&[location.clone()]).expect("Failed to load catalog");
        let scope = catalog.lookup(&location).expect("missing scope");
        assert_eq!(scope.name, "other");
    }

    #[test]
    fn test_load_skips_test_schemas_by_default() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "models.xml", "models", "Person");
        write_schema(dir.path(), "models_test.xml", "models", "Fixture");

        let location = SourceLocation::new(dir.path());
        let catalog = TypeCatalog::load(&[location.clone()]).expect("Failed to load catalog");
        let scope = catalog.lookup(&location).expect("missing scope");
        assert!(scope.record("Fixture").is_none());

        let with_tests = SourceLocation::new(dir.path()).with_tests(true);
        let catalog = TypeCatalog::load(&[with_tests.clone()]).expect("Failed to load catalog");
        let scope = catalog.lookup(&with_tests).expect("missing scope");
        assert!(scope.record("Fixture").is_some());
    }

    #[test]
    fn test_load_duplicate_record_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_schema(dir.path(), "a.xml", "models", "Person");
        write_schema(dir.path(), "b.xml", "models", "Person");

        let result = TypeCatalog::load(&[SourceLocation::new(dir.path())]);
        assert!(matches!(result, Err(LoadError::DuplicateRecord { .. })));
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let result = TypeCatalog::load(&[SourceLocation::new("/nonexistent/fieldgen-test")]);
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
