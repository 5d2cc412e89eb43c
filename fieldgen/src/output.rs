//! Rendering and writing of generated files.

use anyhow::Context;
use fieldgen_codegen::GenerationResult;
use std::fs;
use std::path::Path;

/// Renders a complete generated file: header comment, package clause,
/// import block when references exist, then the generated fragment.
#[must_use]
pub fn render_file(result: &GenerationResult) -> String {
    let mut text = String::new();
    text.push_str("// Code generated by fieldgen; DO NOT EDIT.\n\n");
    if let Some(source) = source_comment() {
        text.push_str(&source);
        text.push('\n');
    }
    text.push_str(&format!("package {}\n", result.package));
    if !result.references.is_empty() {
        text.push_str("\nimport (\n");
        for reference in &result.references {
            text.push_str(&format!("\t{reference:?}\n"));
        }
        text.push_str(")\n");
    }
    text.push_str(&result.text);
    text
}

/// Records the generate directive position when invoked through a build
/// pipeline that sets GOPACKAGE, GOFILE and GOLINE.
fn source_comment() -> Option<String> {
    let package = std::env::var("GOPACKAGE").ok()?;
    let file = std::env::var("GOFILE").ok()?;
    let line = std::env::var("GOLINE").ok()?;
    Some(format!("// Source {package}.{file}:{line}\n"))
}

/// Writes the rendered file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(references: Vec<String>) -> GenerationResult {
        GenerationResult {
            text: "\nconst (\n\tDBColName = \"name\"\n)\n".to_string(),
            references,
            package: "models".to_string(),
        }
    }

    #[test]
    fn test_render_file_without_imports() {
        let text = render_file(&result(vec![]));
        assert!(text.starts_with("// Code generated by fieldgen; DO NOT EDIT.\n\n"));
        assert!(text.contains("package models\n"));
        assert!(!text.contains("import"));
        assert!(text.ends_with("const (\n\tDBColName = \"name\"\n)\n"));
    }

    #[test]
    fn test_render_file_with_imports() {
        let text = render_file(&result(vec![
            "time".to_string(),
            "example.com/app/models".to_string(),
        ]));
        assert!(text.contains("import (\n\t\"time\"\n\t\"example.com/app/models\"\n)\n"));
        let package_pos = text.find("package models").expect("missing package clause");
        let import_pos = text.find("import (").expect("missing import block");
        assert!(package_pos < import_pos);
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("out_generated.go");
        write_file(&path, "package models\n").expect("Failed to write file");
        let written = fs::read_to_string(&path).expect("Failed to read back");
        assert_eq!(written, "package models\n");
    }
}
