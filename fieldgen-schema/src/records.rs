//! Record type definitions and loaded package scopes.

use crate::typeexpr::TypeExpr;
use std::collections::HashMap;

/// A named record type with an ordered list of fields.
#[derive(Debug, Clone)]
pub struct RecordType {
    /// Record name.
    pub name: String,
    /// Declared generic type parameters, in order.
    pub type_params: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<RecordField>,
}

/// One field of a record type.
#[derive(Debug, Clone)]
pub struct RecordField {
    /// Field identifier. For embedded fields this defaults to the local
    /// identifier of the embedded type.
    pub identifier: String,
    /// The field's type expression.
    pub type_expr: TypeExpr,
    /// Raw metadata string in struct-tag notation. Empty if absent.
    pub raw_metadata: String,
    /// Whether the field is embedded (its record fields are promoted).
    pub is_embedded: bool,
}

impl RecordField {
    /// Whether the field is exported. Derived from the identifier: a leading
    /// uppercase letter marks an exported field.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.identifier
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
    }
}

/// One record schema file, before packages are merged by the catalog.
#[derive(Debug, Clone)]
pub struct PackageFile {
    /// Declared package name.
    pub package: String,
    /// Full module path of the package.
    pub module: String,
    /// Records declared in the file, in declaration order.
    pub records: Vec<RecordType>,
}

/// The symbol table of one loaded package.
///
/// Produced by the catalog from all schema files in a directory that declare
/// the same package name. Immutable once built.
#[derive(Debug, Clone)]
pub struct PackageScope {
    /// Package name.
    pub name: String,
    /// Full module path of the package.
    pub module: String,
    /// Records by name.
    records: HashMap<String, RecordType>,
}

impl PackageScope {
    /// Creates an empty scope for a package.
    #[must_use]
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            records: HashMap::new(),
        }
    }

    /// Adds a record to the scope. Returns `false` if a record with the same
    /// name is already present.
    pub fn add_record(&mut self, record: RecordType) -> bool {
        if self.records.contains_key(&record.name) {
            return false;
        }
        self.records.insert(record.name.clone(), record);
        true
    }

    /// Looks up a record by name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&RecordType> {
        self.records.get(name)
    }

    /// Number of records in the scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the scope holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
