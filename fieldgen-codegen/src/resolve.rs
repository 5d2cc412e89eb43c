//! Record resolution.
//!
//! Flattens a record's fields, including embedded records, into an ordered,
//! de-duplicated list of resolved fields with computed constant names, values
//! and encoded types.

use crate::encode;
use crate::error::ResolveError;
use crate::naming;
use crate::request::GenerationRequest;
use fieldgen_schema::{
    Metadata, PackageScope, RecordField, RecordType, TypeCatalog, TypeExpr, override_value,
};
use regex::Regex;
use std::collections::HashSet;

/// One resolved record field, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Generated constant name.
    pub const_name: String,
    /// Constant value.
    pub const_value: String,
    /// Encoded field type text.
    pub type_text: String,
    /// Module references required by the type text.
    pub references: Vec<String>,
}

/// Resolves a request's record into its ordered field list and the shared
/// base name.
///
/// # Errors
/// Returns `ResolveError` if the location is not loaded, the record is
/// absent, the capture expression is invalid, or a field's metadata or type
/// cannot be processed.
pub fn resolve_record(
    catalog: &TypeCatalog,
    request: &GenerationRequest,
) -> Result<(Vec<ResolvedField>, String), ResolveError> {
    let scope = catalog
        .lookup(&request.location)
        .ok_or_else(|| ResolveError::NotLoaded {
            location: request.location.to_string(),
        })?;
    let record = scope
        .record(&request.record)
        .ok_or_else(|| ResolveError::RecordNotFound {
            record: request.record.clone(),
            location: request.location.to_string(),
        })?;

    let tag = request.tag.as_deref().unwrap_or("");
    let base = naming::base_name(&request.naming, tag, &request.record);

    let pattern = match &request.tag_pattern {
        Some(pattern) => Some(Regex::new(pattern).map_err(|source| ResolveError::Pattern {
            pattern: pattern.clone(),
            source,
        })?),
        None => None,
    };

    let mut stack = Vec::new();
    let fields = collect_fields(scope, record, request, &base, pattern.as_ref(), &mut stack)?;
    Ok((fields, base))
}

/// Walks a record's fields in declaration order, recursing into embedded
/// records. Top-level fields always win over embedded ones with the same
/// constant name; across sibling embeddings the first-declared embedding
/// wins. `stack` holds the chain of records currently being flattened; an
/// embedding that refers back into it is a cycle and fails.
fn collect_fields(
    scope: &PackageScope,
    record: &RecordType,
    request: &GenerationRequest,
    base: &str,
    pattern: Option<&Regex>,
    stack: &mut Vec<String>,
) -> Result<Vec<ResolvedField>, ResolveError> {
    stack.push(record.name.clone());
    let mut fields = Vec::new();
    let mut top_level_names = HashSet::new();
    let mut embedded_fields = Vec::new();

    for field in &record.fields {
        if !request.include_unexported && !field.is_exported() {
            continue;
        }

        let metadata =
            Metadata::parse(&field.raw_metadata).map_err(|source| ResolveError::Metadata {
                record: record.name.clone(),
                field: field.identifier.clone(),
                source,
            })?;
        let const_value = compute_value(&metadata, request, field, pattern);

        // The reserved exclusion marker drops the field entirely, embedded
        // or not.
        if const_value == "-" {
            continue;
        }

        if field.is_embedded {
            if let Some(inner) = embedded_record(scope, &field.type_expr) {
                if stack.contains(&inner.name) {
                    let mut chain = stack.join(" -> ");
                    chain.push_str(" -> ");
                    chain.push_str(&inner.name);
                    return Err(ResolveError::EmbeddingCycle { chain });
                }
                let inner_fields =
                    collect_fields(scope, inner, request, base, pattern, stack)?;
                embedded_fields.extend(inner_fields);
                continue;
            }
            // An embedded field that does not resolve to a record in this
            // package is treated as a plain field.
        }

        let encoded =
            encode::encode(&field.type_expr, &scope.module).map_err(|source| {
                ResolveError::Encode {
                    record: record.name.clone(),
                    field: field.identifier.clone(),
                    source,
                }
            })?;

        let const_name = naming::const_name(base, &field.identifier);
        top_level_names.insert(const_name.clone());
        fields.push(ResolvedField {
            const_name,
            const_value,
            type_text: encoded.text,
            references: encoded.references,
        });
    }

    let mut seen_embedded = HashSet::new();
    for field in embedded_fields {
        if top_level_names.contains(&field.const_name) {
            continue;
        }
        if !seen_embedded.insert(field.const_name.clone()) {
            continue;
        }
        fields.push(field);
    }

    stack.pop();
    Ok(fields)
}

/// Computes the constant value for one field: explicit override first, then
/// the configured tag (through the capture expression when set), then the
/// field identifier.
fn compute_value(
    metadata: &Metadata,
    request: &GenerationRequest,
    field: &RecordField,
    pattern: Option<&Regex>,
) -> String {
    if let Some(value) = override_value(metadata, request.tag.as_deref()) {
        return value;
    }

    if let Some(tag) = request.tag.as_deref() {
        if let Some(entry) = metadata.get(tag) {
            match pattern {
                Some(regex) => {
                    let value = entry.value();
                    if !value.is_empty() {
                        if let Some(captures) = regex.captures(&value) {
                            if let Some(group) = captures.get(1) {
                                return group.as_str().to_string();
                            }
                        }
                    }
                    // No match falls back to the field identifier.
                }
                None => {
                    if !entry.name.is_empty() {
                        return entry.name.clone();
                    }
                }
            }
        }
    }

    field.identifier.clone()
}

/// Follows pointers to the named type an embedded field refers to and looks
/// it up in the same package scope.
fn embedded_record<'a>(scope: &'a PackageScope, ty: &TypeExpr) -> Option<&'a RecordType> {
    match ty {
        TypeExpr::Pointer(inner) => embedded_record(scope, inner),
        TypeExpr::Named { module, ident } => {
            let local = module.is_none() || module.as_deref() == Some(scope.module.as_str());
            if local { scope.record(ident) } else { None }
        }
        _ => None,
    }
}
