//! Error types for code generation.

use fieldgen_schema::{LoadError, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid or contradictory request options, detected before
/// any loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A capture expression requires a tag key.
    #[error("cannot use tag pattern '{pattern}' with an empty tag")]
    PatternWithoutTag {
        /// The configured pattern.
        pattern: String,
    },

    /// The record name is required.
    #[error("a record name is required")]
    MissingRecord,

    /// The output package must not be empty.
    #[error("the output package must not be empty")]
    EmptyOutputPackage,
}

/// Error type for encoding a field's type expression.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The type uses a shape the encoder does not support.
    #[error("unsupported type '{expression}'")]
    UnsupportedType {
        /// Source text of the offending type.
        expression: String,
    },
}

/// Error type for resolving a record into its field list.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The request's source location was never loaded into the catalog.
    #[error("source location {location} is not loaded in the catalog")]
    NotLoaded {
        /// Location description.
        location: String,
    },

    /// The record was not found in the loaded package.
    #[error("record '{record}' not found in package at {location}")]
    RecordNotFound {
        /// Record name.
        record: String,
        /// Location description.
        location: String,
    },

    /// The configured capture expression does not compile.
    #[error("failed to compile capture expression '{pattern}': {source}")]
    Pattern {
        /// The configured pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Embedded records refer back to a record already being flattened.
    #[error("embedding cycle detected: {chain}")]
    EmbeddingCycle {
        /// The record chain that closes the cycle, e.g. `A -> B -> A`.
        chain: String,
    },

    /// A field's metadata string does not parse.
    #[error("failed to parse metadata of field '{field}' on record '{record}': {source}")]
    Metadata {
        /// Record name.
        record: String,
        /// Field identifier.
        field: String,
        /// Underlying parse error.
        #[source]
        source: ParseError,
    },

    /// A field's type cannot be encoded.
    #[error("failed to encode type of field '{field}' on record '{record}': {source}")]
    Encode {
        /// Record name.
        record: String,
        /// Field identifier.
        field: String,
        /// Underlying encoding error.
        #[source]
        source: EncodeError,
    },
}

/// Error type for assembling generation results per output target.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Two requests in one output group declare different packages.
    #[error(
        "invalid package values provided: cannot use both '{first}' and '{second}' within output file {target}"
    )]
    ConflictingPackage {
        /// The shared output target.
        target: PathBuf,
        /// Package declared by the first request in the group.
        first: String,
        /// Conflicting package.
        second: String,
    },

    /// The enumeration helper needs a nominal type to attach to.
    #[error(
        "record '{record}': the enumeration helper requires the typed or generic style, got {style}"
    )]
    IncompatibleStyle {
        /// Record name.
        record: String,
        /// The requested style, or "no style".
        style: String,
    },
}

/// Unified error type for a generation run.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Invalid request options.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog loading failed.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Record resolution failed.
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Output assembly failed.
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),
}
