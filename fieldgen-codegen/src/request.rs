//! Generation requests and their options.

use crate::error::ConfigError;
use fieldgen_schema::SourceLocation;
use std::path::PathBuf;

/// The requested shape of the generated wrapper for constant values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `type Base = string` — a plain alias.
    Alias,
    /// `type Base string` — a nominal value type.
    Typed,
    /// `type Base[T any] string` — a generic nominal type parameterized by
    /// the field's own type.
    Generic,
}

impl Style {
    /// The style's flag-facing name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::Typed => "typed",
            Self::Generic => "generic",
        }
    }

    /// Parses a flag-facing style name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alias" => Some(Self::Alias),
            "typed" => Some(Self::Typed),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Options driving constant and type naming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingOptions {
    /// Explicit prefix for generated constant names. When absent the prefix
    /// is derived from the tag key and record name.
    pub prefix: Option<String>,
    /// Whether the record name is included in the derived prefix.
    pub include_record_name: bool,
    /// Whether generated identifiers are exported.
    pub export: bool,
}

/// Destination artifact for one or more generation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Absolute path of the output file.
    pub path: PathBuf,
    /// Package the generated code belongs to.
    pub package: String,
}

/// One caller-supplied unit of work: generate constants for one record.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Where the record's package is loaded from.
    pub location: SourceLocation,
    /// Name of the record to resolve.
    pub record: String,
    /// Metadata key driving constant values, e.g. `db`. When absent, field
    /// identifiers are used.
    pub tag: Option<String>,
    /// Capture expression applied to the tag value; the first capture group
    /// becomes the constant value.
    pub tag_pattern: Option<String>,
    /// Naming options.
    pub naming: NamingOptions,
    /// Requested wrapper style; `None` generates untyped constants.
    pub style: Option<Style>,
    /// Whether to generate the `All()` enumeration helper.
    pub iter: bool,
    /// Whether unexported record fields are included.
    pub include_unexported: bool,
    /// Destination artifact.
    pub output: OutputTarget,
}

impl GenerationRequest {
    /// Validates option combinations that must be rejected before loading.
    ///
    /// # Errors
    /// Returns `ConfigError` for contradictory or incomplete options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record.is_empty() {
            return Err(ConfigError::MissingRecord);
        }
        if self.output.package.is_empty() {
            return Err(ConfigError::EmptyOutputPackage);
        }
        if let Some(pattern) = &self.tag_pattern {
            if self.tag.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::PatternWithoutTag {
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            location: SourceLocation::new("/tmp/schemas"),
            record: "Person".to_string(),
            tag: Some("db".to_string()),
            tag_pattern: None,
            naming: NamingOptions::default(),
            style: None,
            iter: false,
            include_unexported: false,
            output: OutputTarget {
                path: PathBuf::from("/tmp/out/person_generated.go"),
                package: "models".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_validate_pattern_requires_tag() {
        let mut req = request();
        req.tag = None;
        req.tag_pattern = Some("^(.*)$".to_string());
        assert!(matches!(
            req.validate(),
            Err(ConfigError::PatternWithoutTag { .. })
        ));
    }

    #[test]
    fn test_validate_requires_record_and_package() {
        let mut req = request();
        req.record = String::new();
        assert!(matches!(req.validate(), Err(ConfigError::MissingRecord)));

        let mut req = request();
        req.output.package = String::new();
        assert!(matches!(
            req.validate(),
            Err(ConfigError::EmptyOutputPackage)
        ));
    }

    #[test]
    fn test_style_names_round_trip() {
        for style in [Style::Alias, Style::Typed, Style::Generic] {
            assert_eq!(Style::parse(style.name()), Some(style));
        }
        assert_eq!(Style::parse("nonsense"), None);
    }
}
