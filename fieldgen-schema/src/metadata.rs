//! Field metadata in struct-tag notation.
//!
//! A metadata string is a space-separated list of `key:"value"` pairs, e.g.
//! `db:"full_name,omitempty" json:"fullName"`. Each value splits on commas
//! into a name portion and trailing options.
//!
//! The reserved `fieldgen` key overrides the generated constant value for a
//! field: its value is either a single bare token used verbatim, or a token
//! followed by a comma and a space-separated list of `key:value` pairs where
//! the pair matching the configured tag key wins. An empty override is
//! equivalent to absence, and the value `-` excludes the field entirely.

use crate::error::ParseError;

/// The reserved metadata key carrying per-field overrides.
pub const OVERRIDE_KEY: &str = "fieldgen";

/// One parsed metadata entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    /// Entry key.
    pub key: String,
    /// Name portion of the value (before the first comma).
    pub name: String,
    /// Options following the name, in order.
    pub options: Vec<String>,
}

impl MetaEntry {
    /// The full value: name and options rejoined with commas.
    #[must_use]
    pub fn value(&self) -> String {
        if self.options.is_empty() {
            return self.name.clone();
        }
        let mut value = self.name.clone();
        for option in &self.options {
            value.push(',');
            value.push_str(option);
        }
        value
    }
}

/// Parsed field metadata, preserving entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetaEntry>,
}

impl Metadata {
    /// Parses a raw metadata string. An empty string parses to empty metadata.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut entries = Vec::new();
        let mut rest = raw.trim_start();

        while !rest.is_empty() {
            let colon = rest
                .find(':')
                .ok_or_else(|| ParseError::metadata(raw, "expected ':' after key"))?;
            let key = &rest[..colon];
            if key.is_empty() || key.contains(char::is_whitespace) || key.contains('"') {
                return Err(ParseError::metadata(raw, format!("malformed key '{key}'")));
            }
            rest = &rest[colon + 1..];

            if !rest.starts_with('"') {
                return Err(ParseError::metadata(raw, "expected '\"' after ':'"));
            }
            let (value, remainder) = take_quoted(&rest[1..])
                .ok_or_else(|| ParseError::metadata(raw, "unterminated quoted value"))?;
            rest = remainder.trim_start();

            let mut parts = value.split(',');
            let name = parts.next().unwrap_or_default().to_string();
            let options = parts.map(str::to_string).collect();
            entries.push(MetaEntry {
                key: key.to_string(),
                name,
                options,
            });
        }

        Ok(Self { entries })
    }

    /// Looks up the first entry with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// All entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[MetaEntry] {
        &self.entries
    }
}

/// Reads a quoted value body up to its closing '"', handling backslash
/// escapes. Returns the unescaped value and the input after the quote.
fn take_quoted(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &input[i + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(escaped);
            }
            _ => value.push(c),
        }
    }
    None
}

/// Resolves the `fieldgen` override for a field, if any.
///
/// `target_key` is the tag key configured for the request; a `key:value` pair
/// in the override options matching it replaces the name portion. Returns
/// `None` when no non-empty override applies.
#[must_use]
pub fn override_value(metadata: &Metadata, target_key: Option<&str>) -> Option<String> {
    let entry = metadata.get(OVERRIDE_KEY)?;
    let value = entry.value();
    if value.is_empty() {
        return None;
    }

    let (mut name, pairs) = match value.split_once(',') {
        Some((name, pairs)) => (name.to_string(), pairs),
        None => return Some(value),
    };

    if let Some(target) = target_key {
        for pair in pairs.split(' ') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            if let Some((key, pair_value)) = pair.split_once(':') {
                if key == target && !pair_value.is_empty() {
                    name = pair_value.to_string();
                    break;
                }
            }
        }
    }

    if name.is_empty() { None } else { Some(name) }
}
