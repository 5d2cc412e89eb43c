//! Source location identity.

use std::fmt;
use std::path::PathBuf;

/// Identifies one unique load unit: a directory of record schema files, an
/// optional package selector, and whether test schemas are included.
///
/// Two locations with equal [`key`](SourceLocation::key)s share one cached
/// load in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Directory containing record schema files.
    pub dir: PathBuf,
    /// Package to select when the directory declares more than one.
    pub package: Option<String>,
    /// Whether `*_test.xml` schema files are included.
    pub include_tests: bool,
}

impl SourceLocation {
    /// Creates a location for a directory with no package selector.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            package: None,
            include_tests: false,
        }
    }

    /// Selects a named package among several in the directory.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Includes `*_test.xml` schema files in the load.
    #[must_use]
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Catalog cache key for this location.
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}",
            self.dir.display(),
            self.package.as_deref().unwrap_or(""),
            self.include_tests
        )
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.display())?;
        if let Some(package) = &self.package {
            write!(f, "#{package}")?;
        }
        Ok(())
    }
}
