//! # fieldgen-schema
//!
//! Record schema parsing and the concurrent type catalog for fieldgen.
//!
//! This crate provides:
//! - XML record schema parsing
//! - The Go-notation type expression grammar
//! - Struct-tag metadata parsing
//! - The one-shot, deduplicating type catalog

pub mod catalog;
pub mod error;
pub mod location;
pub mod metadata;
pub mod parser;
pub mod records;
pub mod typeexpr;

pub use catalog::TypeCatalog;
pub use error::{LoadError, ParseError};
pub use location::SourceLocation;
pub use metadata::{Metadata, OVERRIDE_KEY, override_value};
pub use parser::parse_package;
pub use records::{PackageFile, PackageScope, RecordField, RecordType};
pub use typeexpr::{ChanDir, TypeExpr, parse_type};
