//! Record schema XML parser.
//!
//! A record schema file declares one package and its records:
//!
//! ```xml
//! <recordSchema package="models" module="example.com/app/models">
//!     <record name="Person">
//!         <field name="FullName" type="string" meta='db:"full_name"'/>
//!         <field name="Age" type="int" meta='db:"age"'/>
//!         <field type="Audit" embedded="true"/>
//!     </record>
//! </recordSchema>
//! ```
//!
//! Field types use the grammar of [`crate::typeexpr`]; metadata strings use
//! the grammar of [`crate::metadata`]. An embedded field may omit its name,
//! which then defaults to the local identifier of the embedded type.

use crate::error::ParseError;
use crate::records::{PackageFile, RecordField, RecordType};
use crate::typeexpr::{self, TypeExpr};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses one record schema file.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, a required attribute is
/// missing, or a type expression or metadata string does not parse.
pub fn parse_package(xml: &str) -> Result<PackageFile, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut package: Option<PackageFile> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "recordSchema" => {
                        package = Some(parse_schema_element(e)?);
                    }
                    "record" => {
                        let package = package.as_mut().ok_or_else(|| {
                            ParseError::InvalidStructure {
                                message: "record element outside recordSchema".to_string(),
                            }
                        })?;
                        let record = parse_record(&mut reader, e)?;
                        package.records.push(record);
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                if name == "record" {
                    let package =
                        package
                            .as_mut()
                            .ok_or_else(|| ParseError::InvalidStructure {
                                message: "record element outside recordSchema".to_string(),
                            })?;
                    let (name, type_params) = parse_record_attrs(e)?;
                    package.records.push(RecordType {
                        name,
                        type_params,
                        fields: Vec::new(),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    package.ok_or_else(|| ParseError::InvalidStructure {
        message: "no recordSchema element found".to_string(),
    })
}

/// Parses the recordSchema element attributes.
fn parse_schema_element(e: &BytesStart<'_>) -> Result<PackageFile, ParseError> {
    let mut package = String::new();
    let mut module = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "package" => package = value.to_string(),
            "module" => module = Some(value.to_string()),
            _ => {}
        }
    }

    if package.is_empty() {
        return Err(ParseError::missing_attr("recordSchema", "package"));
    }

    // A missing module path defaults to the package name, matching a package
    // at the module root.
    let module = module.unwrap_or_else(|| package.clone());

    Ok(PackageFile {
        package,
        module,
        records: Vec::new(),
    })
}

fn parse_record_attrs(e: &BytesStart<'_>) -> Result<(String, Vec<String>), ParseError> {
    let mut name = String::new();
    let mut type_params = Vec::new();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = value.to_string(),
            "params" => {
                type_params = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ParseError::missing_attr("record", "name"));
    }

    Ok((name, type_params))
}

/// Parses a record element and its fields.
fn parse_record(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<RecordType, ParseError> {
    let (name, type_params) = parse_record_attrs(e)?;
    let mut fields = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name == "field" {
                    fields.push(parse_field(e, &type_params)?);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"record" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(RecordType {
        name,
        type_params,
        fields,
    })
}

/// Parses a field element.
fn parse_field(e: &BytesStart<'_>, type_params: &[String]) -> Result<RecordField, ParseError> {
    let mut name = String::new();
    let mut type_src = String::new();
    let mut raw_metadata = String::new();
    let mut is_embedded = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = value.to_string(),
            "type" => type_src = value.to_string(),
            "meta" => raw_metadata = value.to_string(),
            "embedded" => {
                is_embedded = value
                    .parse()
                    .map_err(|_| ParseError::invalid_attr("field", "embedded", value))?;
            }
            _ => {}
        }
    }

    if type_src.is_empty() {
        return Err(ParseError::missing_attr("field", "type"));
    }

    let type_expr = typeexpr::parse_type(&type_src, type_params)?;

    if name.is_empty() {
        if !is_embedded {
            return Err(ParseError::missing_attr("field", "name"));
        }
        name = embedded_identifier(&type_expr).ok_or_else(|| {
            ParseError::invalid_attr("field", "type", type_src.clone())
        })?;
    }

    Ok(RecordField {
        identifier: name,
        type_expr,
        raw_metadata,
        is_embedded,
    })
}

/// Derives the implicit identifier of an embedded field from its type: the
/// local identifier of the named type behind any pointers.
fn embedded_identifier(ty: &TypeExpr) -> Option<String> {
    match ty {
        TypeExpr::Pointer(inner) => embedded_identifier(inner),
        TypeExpr::Named { ident, .. } => Some(ident.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeexpr::TypeExpr;

    const SIMPLE_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<recordSchema package="models" module="example.com/app/models">
    <record name="Person">
        <field name="FullName" type="string" meta='db:"full_name"'/>
        <field name="Age" type="int" meta='db:"age"'/>
        <field type="*Audit" embedded="true"/>
        <field name="secret" type="string"/>
    </record>
    <record name="Audit">
        <field name="CreatedAt" type="time.Time"/>
    </record>
</recordSchema>"#;

    #[test]
    fn test_parse_simple_schema() {
        let package = parse_package(SIMPLE_SCHEMA).expect("Failed to parse schema");

        assert_eq!(package.package, "models");
        assert_eq!(package.module, "example.com/app/models");
        assert_eq!(package.records.len(), 2);
    }

    #[test]
    fn test_parse_fields_in_order() {
        let package = parse_package(SIMPLE_SCHEMA).expect("Failed to parse schema");
        let person = &package.records[0];

        assert_eq!(person.name, "Person");
        let names: Vec<&str> = person
            .fields
            .iter()
            .map(|f| f.identifier.as_str())
            .collect();
        assert_eq!(names, vec!["FullName", "Age", "Audit", "secret"]);
        assert_eq!(person.fields[0].raw_metadata, r#"db:"full_name""#);
    }

    #[test]
    fn test_parse_embedded_field_name_defaults_to_type() {
        let package = parse_package(SIMPLE_SCHEMA).expect("Failed to parse schema");
        let embedded = &package.records[0].fields[2];

        assert!(embedded.is_embedded);
        assert_eq!(embedded.identifier, "Audit");
        assert!(matches!(embedded.type_expr, TypeExpr::Pointer(_)));
    }

    #[test]
    fn test_parse_generic_record() {
        let xml = r#"<recordSchema package="models">
            <record name="Box" params="T">
                <field name="Value" type="T"/>
            </record>
        </recordSchema>"#;
        let package = parse_package(xml).expect("Failed to parse schema");
        let record = &package.records[0];

        assert_eq!(record.type_params, vec!["T".to_string()]);
        assert_eq!(
            record.fields[0].type_expr,
            TypeExpr::TypeParam("T".to_string())
        );
    }

    #[test]
    fn test_parse_module_defaults_to_package() {
        let xml = r#"<recordSchema package="models"><record name="R"/></recordSchema>"#;
        let package = parse_package(xml).expect("Failed to parse schema");
        assert_eq!(package.module, "models");
        assert!(package.records[0].fields.is_empty());
    }

    #[test]
    fn test_parse_missing_attributes() {
        let no_package = r#"<recordSchema><record name="R"/></recordSchema>"#;
        assert!(parse_package(no_package).is_err());

        let no_type = r#"<recordSchema package="p">
            <record name="R"><field name="F"/></record>
        </recordSchema>"#;
        assert!(parse_package(no_type).is_err());

        let unnamed = r#"<recordSchema package="p">
            <record name="R"><field type="string"/></record>
        </recordSchema>"#;
        assert!(parse_package(unnamed).is_err());
    }
}
