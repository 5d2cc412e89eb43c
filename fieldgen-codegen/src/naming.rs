//! Constant and type name derivation.

use crate::request::NamingOptions;

/// Derives the base name shared by the generated type and all constant names
/// of one request.
///
/// The tag key is uppercased when export or record-name inclusion is
/// requested and lowercased otherwise; the prefix is the explicit prefix if
/// set, else `record + casedTag + "Field"` with record-name inclusion, else
/// `casedTag + "Field"`. The first character's case always follows the export
/// flag — that is the sole exported/unexported signal in generated
/// identifiers.
#[must_use]
pub fn base_name(options: &NamingOptions, tag: &str, record: &str) -> String {
    let cased_tag = if options.include_record_name || options.export {
        tag.to_uppercase()
    } else {
        tag.to_lowercase()
    };

    let prefix = match &options.prefix {
        Some(prefix) => prefix.clone(),
        None if options.include_record_name => format!("{record}{cased_tag}Field"),
        None => format!("{cased_tag}Field"),
    };

    force_first_case(&prefix, options.export)
}

/// The constant name for one field: base name + field identifier, with no
/// separator.
#[must_use]
pub fn const_name(base: &str, identifier: &str) -> String {
    format!("{base}{identifier}")
}

/// Returns `name` with its first character uppercased or lowercased.
fn force_first_case(name: &str, upper: bool) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let first: String = if upper {
                first.to_uppercase().collect()
            } else {
                first.to_lowercase().collect()
            };
            format!("{first}{}", chars.as_str())
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(
        prefix: Option<&str>,
        include_record_name: bool,
        export: bool,
    ) -> NamingOptions {
        NamingOptions {
            prefix: prefix.map(str::to_string),
            include_record_name,
            export,
        }
    }

    #[test]
    fn test_default_prefix_from_tag() {
        assert_eq!(base_name(&options(None, false, false), "db", "Person"), "dbField");
        assert_eq!(base_name(&options(None, false, true), "db", "Person"), "DBField");
    }

    #[test]
    fn test_record_name_inclusion() {
        assert_eq!(
            base_name(&options(None, true, false), "db", "Person"),
            "personDBField"
        );
        assert_eq!(
            base_name(&options(None, true, true), "db", "Person"),
            "PersonDBField"
        );
    }

    #[test]
    fn test_explicit_prefix_wins() {
        assert_eq!(
            base_name(&options(Some("DBCol"), false, true), "db", "Person"),
            "DBCol"
        );
        assert_eq!(
            base_name(&options(Some("DBCol"), false, false), "db", "Person"),
            "dBCol"
        );
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(base_name(&options(None, false, false), "", "Person"), "field");
        assert_eq!(base_name(&options(None, false, true), "", "Person"), "Field");
    }

    #[test]
    fn test_const_name_concatenates() {
        assert_eq!(const_name("DBCol", "FullName"), "DBColFullName");
    }
}
