//! Type expression encoding.
//!
//! Renders any type reachable from a field into Go-notation text, collecting
//! the module references the text requires. Pure and recursive; unsupported
//! shapes fail rather than emit incorrect text.

use crate::error::EncodeError;
use fieldgen_schema::{ChanDir, TypeExpr};

/// An encoded type: its textual form and the modules it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedType {
    /// Textual form of the type.
    pub text: String,
    /// Module paths the text requires as imports, deduplicated, first-seen
    /// order.
    pub references: Vec<String>,
}

impl EncodedType {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            references: Vec::new(),
        }
    }
}

/// Encodes a type expression relative to `home_module`. Named types owned by
/// the home module are emitted unqualified and without a reference.
///
/// # Errors
/// Returns `EncodeError::UnsupportedType` for shapes the generator does not
/// handle.
pub fn encode(ty: &TypeExpr, home_module: &str) -> Result<EncodedType, EncodeError> {
    match ty {
        TypeExpr::Primitive(name) => Ok(EncodedType::plain(name.clone())),
        TypeExpr::Pointer(elem) => {
            let elem = encode(elem, home_module)?;
            Ok(EncodedType {
                text: format!("*{}", elem.text),
                references: elem.references,
            })
        }
        TypeExpr::Slice(elem) => {
            let elem = encode(elem, home_module)?;
            Ok(EncodedType {
                text: format!("[]{}", elem.text),
                references: elem.references,
            })
        }
        TypeExpr::Array(length, elem) => {
            let elem = encode(elem, home_module)?;
            Ok(EncodedType {
                text: format!("[{length}]{}", elem.text),
                references: elem.references,
            })
        }
        TypeExpr::Chan(dir, elem) => {
            let elem = encode(elem, home_module)?;
            let text = match dir {
                ChanDir::Both => format!("chan {}", elem.text),
                ChanDir::Send => format!("chan<- {}", elem.text),
                ChanDir::Recv => format!("<-chan {}", elem.text),
            };
            Ok(EncodedType {
                text,
                references: elem.references,
            })
        }
        TypeExpr::Map(key, value) => {
            let key = encode(key, home_module)?;
            let value = encode(value, home_module)?;
            let mut references = key.references;
            merge_references(&mut references, value.references);
            Ok(EncodedType {
                text: format!("map[{}]{}", key.text, value.text),
                references,
            })
        }
        TypeExpr::Func { params, results } => encode_func(params, results, home_module),
        TypeExpr::TypeParam(_) => Ok(EncodedType::plain("any")),
        TypeExpr::Named { module, ident } => Ok(encode_named(module.as_deref(), ident, home_module)),
        TypeExpr::Unsupported(raw) => Err(EncodeError::UnsupportedType {
            expression: raw.clone(),
        }),
    }
}

fn encode_func(
    params: &[TypeExpr],
    results: &[TypeExpr],
    home_module: &str,
) -> Result<EncodedType, EncodeError> {
    let mut text = String::from("func(");
    let mut references = Vec::new();

    for (i, param) in params.iter().enumerate() {
        let encoded = encode(param, home_module)?;
        if i > 0 {
            text.push_str(", ");
        }
        text.push_str(&encoded.text);
        merge_references(&mut references, encoded.references);
    }
    text.push(')');

    if !results.is_empty() {
        text.push(' ');
        if results.len() > 1 {
            text.push('(');
        }
        for (i, result) in results.iter().enumerate() {
            let encoded = encode(result, home_module)?;
            if i > 0 {
                text.push_str(", ");
            }
            text.push_str(&encoded.text);
            merge_references(&mut references, encoded.references);
        }
        if results.len() > 1 {
            text.push(')');
        }
    }

    Ok(EncodedType { text, references })
}

/// Encodes a named type. A type owned by the home module (or declared in the
/// home package) stays unqualified; anything else is qualified by the last
/// segment of its module path and records one reference to the full path.
fn encode_named(module: Option<&str>, ident: &str, home_module: &str) -> EncodedType {
    match module {
        None => EncodedType::plain(ident),
        Some(module) if module == home_module => EncodedType::plain(ident),
        Some(module) => {
            let qualifier = module.rsplit('/').next().unwrap_or(module);
            EncodedType {
                text: format!("{qualifier}.{ident}"),
                references: vec![module.to_string()],
            }
        }
    }
}

/// Appends `extra` onto `references`, deduplicating by exact module path and
/// preserving first-seen order.
fn merge_references(references: &mut Vec<String>, extra: Vec<String>) {
    for reference in extra {
        if !references.contains(&reference) {
            references.push(reference);
        }
    }
}
