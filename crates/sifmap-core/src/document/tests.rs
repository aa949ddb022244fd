//! Tests for rule documents

use super::*;
use crate::error::DefinitionKind;
use crate::field_rule::NullBehavior;
use crate::types::{DataType, Direction};
use crate::version::SifVersion;
use pretty_assertions::assert_eq;
use std::io::Write;

const DOCUMENT: &str = r#"
types:
  - { object: StudentPersonal, path: Demographics/BirthDate, type: date }
  - { object: StudentPersonal, path: GradeLevel, type: int, since: "2.0" }
properties:
  district: Springfield
valuesets:
  - id: Ethnicity
    title: Ethnicity codes
    entries:
      - { app: W, sif: "0100", title: White }
      - { app: B, sif: "0200" }
      - { sif: "9999" }
    app_default: { value: W, render_if_null: false }
scopes:
  - id: Default
    versions: "*"
    objects:
      - object: StudentPersonal
        fields:
          - { name: FIRSTNAME, rule: "Name[@Type='04']/FirstName" }
          - { name: GRADE, otherid: { type: "06", prefix: "GRADE:" } }
          - name: BIRTHDATE
            rule: Demographics/BirthDate
            ifnull: suppress
          - name: ETHNICITY
            rule: Demographics/Ethnicity
            valueset: Ethnicity
            default: W
            direction: inbound
            sif_version: "+2.0"
    scopes:
      - id: MA
        zones: "MA_ZONE, *"
        sources: "SIS1,SIS2"
        versions: "1.5r1,2.0"
"#;

#[test]
fn test_load_yaml_document() {
    let mappings = Mappings::from_yaml_str(DOCUMENT).unwrap();
    assert_eq!(mappings.len(), 3);
    assert_eq!(mappings.property(mappings.root(), "district", false), Some("Springfield"));

    let default = mappings.find("Default").unwrap();
    let rules = mappings.rules_for(default, "StudentPersonal", false);
    assert_eq!(rules.len(), 4);

    let ethnicity = rules.iter().find(|r| r.name() == "ETHNICITY").unwrap();
    assert_eq!(ethnicity.value_set(), Some("Ethnicity"));
    assert_eq!(ethnicity.default_value(), Some("W"));
    let filter = ethnicity.filter().unwrap();
    assert_eq!(filter.direction, Some(Direction::Inbound));
    assert_eq!(filter.version.unwrap().to_string(), "+2.0");

    let birth = rules.iter().find(|r| r.name() == "BIRTHDATE").unwrap();
    assert_eq!(birth.null_behavior(), NullBehavior::Suppress);

    let ma = mappings.find("MA").unwrap();
    let scope = mappings.scope(ma).unwrap();
    assert_eq!(scope.zones(), None);
    assert_eq!(scope.sources(), Some(&["SIS1".to_string(), "SIS2".to_string()][..]));
    assert_eq!(scope.versions().map(<[SifVersion]>::len), Some(2));
    assert_eq!(mappings.scope(default).unwrap().versions(), None);

    let set = mappings.value_set(ma, "Ethnicity", true).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.title_for("W"), Some("White"));
    assert_eq!(set.translate(Some("B"), None).as_deref(), Some("0200"));
    assert_eq!(set.translate_reverse(Some("0300"), None).as_deref(), Some("W"));
    assert_eq!(set.translate(Some("X"), None).as_deref(), Some("X"));

    let catalog = mappings.catalog();
    assert_eq!(
        catalog.lookup("StudentPersonal", "Demographics/BirthDate", SifVersion::SIF11),
        Some(DataType::Date)
    );
    assert_eq!(catalog.lookup("StudentPersonal", "GradeLevel", SifVersion::SIF15R1), None);
    assert_eq!(
        catalog.lookup("StudentPersonal", "GradeLevel", SifVersion::SIF21),
        Some(DataType::Int)
    );
}

#[test]
fn test_document_round_trip_through_files() {
    let mappings = Mappings::from_yaml_str(DOCUMENT).unwrap();
    let dir = tempfile::tempdir().unwrap();

    for name in ["rules.yaml", "rules.json"] {
        let path = dir.path().join(name);
        mappings.save_file(&path).unwrap();
        let reloaded = Mappings::load_file(&path).unwrap();
        assert_eq!(reloaded.to_document(), mappings.to_document());
    }
}

#[test]
fn test_load_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"scopes": [{{"id": "Default", "objects": [{{"object": "StaffPersonal",
            "fields": [{{"name": "LAST", "rule": "Name/LastName"}}]}}]}}]}}"#
    )
    .unwrap();

    let mappings = Mappings::load_file(file.path()).unwrap();
    let default = mappings.find("Default").unwrap();
    assert_eq!(mappings.rules_for(default, "StaffPersonal", true).len(), 1);
}

#[test]
fn test_format_detection() {
    assert_eq!(Format::from_path(Path::new("a.yml")).unwrap(), Format::Yaml);
    assert_eq!(Format::from_path(Path::new("a.YAML")).unwrap(), Format::Yaml);
    assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
    assert!(matches!(
        Format::from_path(Path::new("a.xml")),
        Err(Error::Configuration { .. })
    ));
    assert_eq!(Format::Json.primary_extension(), "json");
}

#[test]
fn test_malformed_documents() {
    let both = r#"
objects:
  - object: StudentPersonal
    fields:
      - { name: X, rule: "A", otherid: { type: "01" } }
"#;
    let err = Mappings::from_yaml_str(both).unwrap_err();
    assert!(err.to_string().contains("field 'X'"));

    let neither = "objects: [{ object: StudentPersonal, fields: [{ name: X }] }]";
    assert!(matches!(
        Mappings::from_yaml_str(neither),
        Err(Error::Configuration { .. })
    ));

    let bad_type = "objects: [{ object: S, fields: [{ name: X, rule: A, datatype: blob }] }]";
    assert!(matches!(
        Mappings::from_yaml_str(bad_type),
        Err(Error::Configuration { .. })
    ));

    let unknown_key = "objects: [{ object: S, fields: [{ name: X, rule: A, colour: red }] }]";
    assert!(matches!(
        Mappings::from_yaml_str(unknown_key),
        Err(Error::Yaml { .. })
    ));

    let bad_version = "scopes: [{ id: A, versions: \"2.x\" }]";
    assert!(Mappings::from_yaml_str(bad_version).is_err());
}

#[test]
fn test_duplicates_in_documents() {
    let duplicate_field = r#"
objects:
  - object: S
    fields:
      - { name: X, rule: A }
      - { name: X, rule: B }
"#;
    assert!(matches!(
        Mappings::from_yaml_str(duplicate_field),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::FieldRule, .. })
    ));

    let duplicate_scope = "scopes: [{ id: A }, { id: A }]";
    assert!(matches!(
        Mappings::from_yaml_str(duplicate_scope),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::Scope, .. })
    ));

    let undefined_default = r#"
valuesets:
  - id: Y
    entries: [{ app: a, sif: "1" }]
    sif_default: { value: "2", render_if_null: true }
"#;
    assert!(matches!(
        Mappings::from_yaml_str(undefined_default),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::ValueSetDefault, .. })
    ));
}
