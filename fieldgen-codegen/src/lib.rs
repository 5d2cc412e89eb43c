//! # fieldgen-codegen
//!
//! Constant and wrapper-type generation from record schemas.
//!
//! This crate provides:
//! - Generation requests and their validation
//! - The naming engine for constant and type names
//! - The type expression encoder
//! - The struct resolver (flattening, shadowing, metadata-driven values)
//! - The output assembler producing one result per output target

pub mod assemble;
pub mod encode;
pub mod error;
pub mod naming;
pub mod request;
pub mod resolve;

pub use assemble::{GenerationResult, assemble};
pub use encode::{EncodedType, encode};
pub use error::{AssemblyError, CodegenError, ConfigError, EncodeError, ResolveError};
pub use naming::{base_name, const_name};
pub use request::{GenerationRequest, NamingOptions, OutputTarget, Style};
pub use resolve::{ResolvedField, resolve_record};
