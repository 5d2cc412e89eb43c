//! End-to-end generation tests: schema files on disk, catalog load, assembly.

use fieldgen_codegen::{
    AssemblyError, CodegenError, GenerationRequest, NamingOptions, OutputTarget, ResolveError,
    Style, assemble,
};
use fieldgen_schema::{SourceLocation, TypeCatalog};
use std::fs;
use std::path::PathBuf;

const PERSON_SCHEMA: &str = r#"<recordSchema package="models" module="example.com/app/models">
    <record name="Person">
        <field name="FullName" type="string" meta='db:"full_name" json:"fullName"'/>
        <field name="Age" type="int" meta='db:"age"'/>
        <field name="Skipped" type="string" meta='db:"-"'/>
        <field type="Audit" embedded="true"/>
    </record>
    <record name="Audit">
        <field name="Age" type="int64" meta='db:"audit_age"'/>
        <field name="UpdatedAt" type="time.Time" meta='db:"updated_at"'/>
    </record>
</recordSchema>"#;

struct Fixture {
    _dir: tempfile::TempDir,
    catalog: TypeCatalog,
    location: SourceLocation,
}

fn fixture(schema: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("models.xml"), schema).expect("Failed to write schema");
    let location = SourceLocation::new(dir.path());
    let catalog =
        TypeCatalog::load(std::slice::from_ref(&location)).expect("Failed to load catalog");
    Fixture {
        _dir: dir,
        catalog,
        location,
    }
}

fn person_request(location: SourceLocation, path: &str) -> GenerationRequest {
    GenerationRequest {
        location,
        record: "Person".to_string(),
        tag: Some("db".to_string()),
        tag_pattern: None,
        naming: NamingOptions {
            prefix: Some("DBCol".to_string()),
            include_record_name: false,
            export: true,
        },
        style: None,
        iter: false,
        include_unexported: false,
        output: OutputTarget {
            path: PathBuf::from(path),
            package: "models".to_string(),
        },
    }
}

#[test]
fn untyped_constants_follow_declaration_order_with_shadowing() {
    let fixture = fixture(PERSON_SCHEMA);
    let requests = vec![person_request(
        fixture.location.clone(),
        "/out/person_db_generated.go",
    )];

    let results = assemble(&fixture.catalog, &requests).expect("Failed to assemble");
    let result = &results[&PathBuf::from("/out/person_db_generated.go")];

    // Outer Age shadows the embedded Age; Skipped is excluded; UpdatedAt
    // survives the flattening.
    let expected = "\n\
// Constants generated from [Person] struct field\n\
const (\n\
\tDBColFullName = \"full_name\"\n\
\tDBColAge = \"age\"\n\
\tDBColUpdatedAt = \"updated_at\"\n\
)\n";
    assert_eq!(result.text, expected);
    assert!(result.references.is_empty());
}

#[test]
fn typed_style_with_enumeration_helper() {
    let fixture = fixture(PERSON_SCHEMA);
    let mut request = person_request(fixture.location.clone(), "/out/person_db_generated.go");
    request.style = Some(Style::Typed);
    request.iter = true;

    let results = assemble(&fixture.catalog, &[request]).expect("Failed to assemble");
    let text = &results[&PathBuf::from("/out/person_db_generated.go")].text;

    assert!(text.contains("type DBCol string"));
    assert!(text.contains("func (d DBCol) String() string { return (string)(d) }"));
    assert!(text.contains("func (d DBCol) All() [3]string"));
    assert!(text.contains("\t\t\"full_name\",\n\t\t\"age\",\n\t\t\"updated_at\",\n"));
    assert!(text.contains("\tDBColFullName DBCol = \"full_name\"\n"));
}

#[test]
fn generic_style_carries_field_types_and_references() {
    let fixture = fixture(PERSON_SCHEMA);
    let mut request = person_request(fixture.location.clone(), "/out/person_db_generated.go");
    request.style = Some(Style::Generic);

    let results = assemble(&fixture.catalog, &[request]).expect("Failed to assemble");
    let result = &results[&PathBuf::from("/out/person_db_generated.go")];

    assert!(result.text.contains("type DBCol[T any] string"));
    assert!(result.text.contains("\tDBColFullName DBCol[string] = \"full_name\"\n"));
    assert!(result.text.contains("\tDBColAge DBCol[int] = \"age\"\n"));
    assert!(
        result
            .text
            .contains("\tDBColUpdatedAt DBCol[time.Time] = \"updated_at\"\n")
    );
    assert_eq!(result.references, vec!["time".to_string()]);
}

#[test]
fn different_tags_share_one_output_file() {
    let fixture = fixture(PERSON_SCHEMA);
    let db = person_request(fixture.location.clone(), "/out/person_generated.go");
    let mut json = person_request(fixture.location.clone(), "/out/person_generated.go");
    json.tag = Some("json".to_string());
    json.naming.prefix = Some("JSONKey".to_string());

    let results = assemble(&fixture.catalog, &[db, json]).expect("Failed to assemble");
    assert_eq!(results.len(), 1);
    let text = &results[&PathBuf::from("/out/person_generated.go")].text;

    assert!(text.contains("DBColFullName = \"full_name\""));
    assert!(text.contains("JSONKeyFullName = \"fullName\""));
    // Metadata-free under the json tag falls back to the identifier.
    assert!(text.contains("JSONKeyAge = \"Age\""));
    let db_pos = text.find("DBColFullName").expect("missing db block");
    let json_pos = text.find("JSONKeyFullName").expect("missing json block");
    assert!(db_pos < json_pos);
}

#[test]
fn conflicting_packages_fail_before_generation() {
    let fixture = fixture(PERSON_SCHEMA);
    let first = person_request(fixture.location.clone(), "/out/person_generated.go");
    let mut second = person_request(fixture.location.clone(), "/out/person_generated.go");
    second.output.package = "elsewhere".to_string();

    let result = assemble(&fixture.catalog, &[first, second]);
    assert!(matches!(
        result,
        Err(CodegenError::Assembly(
            AssemblyError::ConflictingPackage { .. }
        ))
    ));
}

#[test]
fn one_bad_request_aborts_all_groups() {
    let fixture = fixture(PERSON_SCHEMA);
    let good = person_request(fixture.location.clone(), "/out/a_generated.go");
    let mut bad = person_request(fixture.location.clone(), "/out/b_generated.go");
    bad.record = "Nonexistent".to_string();

    let result = assemble(&fixture.catalog, &[good, bad]);
    assert!(result.is_err());
}

#[test]
fn cyclic_embedding_is_rejected() {
    let schema = r#"<recordSchema package="models" module="example.com/app/models">
    <record name="Person">
        <field name="FullName" type="string" meta='db:"full_name"'/>
        <field type="Person" embedded="true"/>
    </record>
</recordSchema>"#;
    let fixture = fixture(schema);
    let requests = vec![person_request(
        fixture.location.clone(),
        "/out/person_generated.go",
    )];

    let result = assemble(&fixture.catalog, &requests);
    assert!(matches!(
        result,
        Err(CodegenError::Resolve(ResolveError::EmbeddingCycle { .. }))
    ));
}

#[test]
fn assembly_is_idempotent() {
    let fixture = fixture(PERSON_SCHEMA);
    let mut request = person_request(fixture.location.clone(), "/out/person_generated.go");
    request.style = Some(Style::Typed);
    request.iter = true;
    let requests = vec![request];

    let first = assemble(&fixture.catalog, &requests).expect("Failed to assemble");
    let second = assemble(&fixture.catalog, &requests).expect("Failed to assemble");
    assert_eq!(first, second);
}
