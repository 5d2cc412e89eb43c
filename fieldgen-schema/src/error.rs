//! Error types for schema parsing and catalog loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for parsing record schema files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Malformed type expression.
    #[error("invalid type expression '{expression}': {message}")]
    TypeExpression {
        /// The offending expression text.
        expression: String,
        /// What went wrong.
        message: String,
    },

    /// Malformed field metadata string.
    #[error("invalid metadata '{raw}': {message}")]
    Metadata {
        /// The raw metadata string.
        raw: String,
        /// What went wrong.
        message: String,
    },

    /// Invalid schema structure.
    #[error("invalid schema structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates a type expression error.
    pub fn type_expr(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Creates a metadata error.
    pub fn metadata(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metadata {
            raw: raw.into(),
            message: message.into(),
        }
    }
}

/// Error type for loading the type catalog from source locations.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem error while reading a schema directory or file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A schema file failed to parse.
    #[error("failed to parse schema file {file}: {source}")]
    Schema {
        /// File that failed.
        file: PathBuf,
        /// Underlying parse error.
        #[source]
        source: ParseError,
    },

    /// The same record is declared twice within one package.
    #[error("duplicate record '{record}' in package '{package}'")]
    DuplicateRecord {
        /// Package name.
        package: String,
        /// Record name.
        record: String,
    },

    /// No usable package was found at a location.
    #[error("no package found at {location}")]
    NoPackage {
        /// Location description.
        location: String,
    },

    /// A location resolved to more than one package after filtering.
    #[error("expected to find 1 package at {location}, found {count}: {found}")]
    AmbiguousPackage {
        /// Location description.
        location: String,
        /// Number of candidate packages.
        count: usize,
        /// Names of the candidate packages.
        found: String,
    },
}

impl LoadError {
    /// Creates an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
