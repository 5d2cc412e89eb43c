//! Output assembly.
//!
//! Groups generation requests by output target, validates each group,
//! resolves every request, and merges the generated fragments and module
//! references into one result per target. Groups are generated concurrently;
//! they share nothing but the immutable catalog. This component performs no
//! I/O.

use crate::error::{AssemblyError, CodegenError};
use crate::request::{GenerationRequest, Style};
use crate::resolve::{self, ResolvedField};
use fieldgen_schema::TypeCatalog;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;

/// The merged generation output for one target: a self-contained text
/// fragment and the module references the caller must turn into imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Generated source fragment (type declarations, constants, helpers).
    pub text: String,
    /// Required module references, deduplicated, first-seen order.
    pub references: Vec<String>,
    /// Package the generated code belongs to.
    pub package: String,
}

/// Assembles all requests into one [`GenerationResult`] per output target.
///
/// Validation happens before any generation: contradictory request options,
/// conflicting package identifiers within a group, and the enumeration
/// helper combined with a style it cannot attach to all fail up front. Any
/// later resolution or encoding error aborts the whole run; nothing partial
/// is returned.
///
/// # Errors
/// Returns the first `CodegenError` encountered.
pub fn assemble(
    catalog: &TypeCatalog,
    requests: &[GenerationRequest],
) -> Result<BTreeMap<PathBuf, GenerationResult>, CodegenError> {
    for request in requests {
        request.validate()?;
        if request.iter && !matches!(request.style, Some(Style::Typed | Style::Generic)) {
            return Err(AssemblyError::IncompatibleStyle {
                record: request.record.clone(),
                style: request
                    .style
                    .map_or("no style", Style::name)
                    .to_string(),
            }
            .into());
        }
    }

    let groups = group_by_target(requests)?;

    let (tx, rx) = crossbeam_channel::bounded(groups.len());
    thread::scope(|scope| {
        for (path, members) in &groups {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = generate_group(catalog, members);
                let _ = tx.send((path.clone(), result));
            });
        }
    });
    drop(tx);

    let mut results = BTreeMap::new();
    let mut first_error = None;
    for (path, result) in rx {
        match result {
            Ok(result) => {
                tracing::debug!(target = %path.display(), "generated output group");
                results.insert(path, result);
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
        None => Ok(results),
    }
}

/// Groups requests by output path, preserving first-seen target order and
/// request order within each group. All requests sharing a target must agree
/// on the output package.
fn group_by_target(
    requests: &[GenerationRequest],
) -> Result<Vec<(PathBuf, Vec<&GenerationRequest>)>, AssemblyError> {
    let mut groups: Vec<(PathBuf, Vec<&GenerationRequest>)> = Vec::new();

    for request in requests {
        match groups
            .iter_mut()
            .find(|(path, _)| *path == request.output.path)
        {
            Some((path, members)) => {
                let first = &members[0].output.package;
                if *first != request.output.package {
                    return Err(AssemblyError::ConflictingPackage {
                        target: path.clone(),
                        first: first.clone(),
                        second: request.output.package.clone(),
                    });
                }
                members.push(request);
            }
            None => groups.push((request.output.path.clone(), vec![request])),
        }
    }

    Ok(groups)
}

/// Generates one output group: every member request resolved independently,
/// fragments concatenated in request order, references unioned first-seen.
fn generate_group(
    catalog: &TypeCatalog,
    members: &[&GenerationRequest],
) -> Result<GenerationResult, CodegenError> {
    let mut text = String::new();
    let mut references: Vec<String> = Vec::new();

    for (i, request) in members.iter().enumerate() {
        let fragment = generate_request(catalog, request)?;
        if i > 0 {
            text.push('\n');
        }
        text.push_str(&fragment.text);
        for reference in fragment.references {
            if !references.contains(&reference) {
                references.push(reference);
            }
        }
    }

    Ok(GenerationResult {
        text,
        references,
        package: members[0].output.package.clone(),
    })
}

struct Fragment {
    text: String,
    references: Vec<String>,
}

/// Generates the text fragment for one request.
fn generate_request(
    catalog: &TypeCatalog,
    request: &GenerationRequest,
) -> Result<Fragment, CodegenError> {
    let (fields, base) = resolve::resolve_record(catalog, request)?;
    let record = &request.record;
    let receiver = base.chars().next().map_or_else(String::new, |c| {
        c.to_lowercase().to_string()
    });

    let mut out = String::new();

    if let Some(style) = request.style {
        out.push_str(&format!(
            "// {base} is a strong type generated from {record}. Its type is used for all of its related generated constants.\n"
        ));
        match style {
            Style::Alias => {
                out.push_str(&format!("type {base} = string\n"));
            }
            Style::Typed => {
                out.push_str(&format!("type {base} string\n\n"));
                out.push_str("// String implements the [fmt.Stringer] interface\n");
                out.push_str(&format!(
                    "func ({receiver} {base}) String() string {{ return (string)({receiver}) }}\n"
                ));
            }
            Style::Generic => {
                out.push_str(&format!("type {base}[T any] string\n\n"));
                out.push_str("// String implements the [fmt.Stringer] interface\n");
                out.push_str(&format!(
                    "func ({receiver} {base}[T]) String() string {{ return (string)({receiver}) }}\n"
                ));
            }
        }
    }

    if request.iter {
        out.push('\n');
        out.push_str(&format!(
            "// All was generated from the [{record}] struct. It returns an array of all [{base}]'s associated constant values.\n"
        ));
        let receiver_type = match request.style {
            Some(Style::Generic) => format!("{base}[T]"),
            _ => base.clone(),
        };
        out.push_str(&format!(
            "func ({receiver} {receiver_type}) All() [{n}]string {{\n",
            n = fields.len()
        ));
        out.push_str(&format!("\treturn [{n}]string{{\n", n = fields.len()));
        for field in &fields {
            out.push_str(&format!("\t\t{},\n", quoted(&field.const_value)));
        }
        out.push_str("\t}\n");
        out.push_str("}\n");
    }

    if !fields.is_empty() {
        out.push('\n');
        out.push_str(&format!("// Constants generated from [{record}] struct field\n"));
        out.push_str("const (\n");
        for field in &fields {
            out.push_str(&const_line(request.style, &base, field));
        }
        out.push_str(")\n");
    }

    // Only the generic style embeds field types in the output, so only it
    // requires imports.
    let references = if request.style == Some(Style::Generic) {
        let mut references: Vec<String> = Vec::new();
        for field in &fields {
            for reference in &field.references {
                if !references.contains(reference) {
                    references.push(reference.clone());
                }
            }
        }
        references
    } else {
        Vec::new()
    };

    Ok(Fragment {
        text: out,
        references,
    })
}

fn const_line(style: Option<Style>, base: &str, field: &ResolvedField) -> String {
    let name = &field.const_name;
    let value = quoted(&field.const_value);
    match style {
        None => format!("\t{name} = {value}\n"),
        Some(Style::Alias) | Some(Style::Typed) => format!("\t{name} {base} = {value}\n"),
        Some(Style::Generic) => {
            format!("\t{name} {base}[{}] = {value}\n", field.type_text)
        }
    }
}

/// Quotes a constant value as an interpreted string literal in the output
/// language. Non-printable characters use `\uXXXX` escapes.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
