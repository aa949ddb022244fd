//! Shared test support utilities for integration tests

#![allow(dead_code)]

use sifmap_core::xpath;
use sifmap_core::{Element, Mappings, ScopeId, StringMapAdaptor};

/// Rule document used across the integration suites
pub const STUDENT_RULES: &str = r#"
types:
  - { object: StudentPersonal, path: Demographics/BirthDate, type: date }
  - { object: StudentPersonal, path: Active, type: boolean }
valuesets:
  - id: Gender
    entries:
      - { app: "1", sif: M, title: Male }
      - { app: "2", sif: F, title: Female }
scopes:
  - id: Default
    objects:
      - object: StudentPersonal
        fields:
          - { name: FIRSTNAME, rule: "Name[@Type='04']/FirstName" }
          - { name: LASTNAME, rule: "Name[@Type='04']/LastName" }
          - { name: BIRTHDATE, rule: Demographics/BirthDate, ifnull: suppress }
          - { name: GENDER, rule: Demographics/Gender, valueset: Gender }
          - { name: ACTIVE, rule: Active }
          - name: GRADE
            rule: "OtherIdList/OtherId[@Type='06'+]=GRADE:$(GRADE)"
            direction: outbound
          - name: GRADE
            otherid: { type: "06", prefix: "GRADE:" }
            direction: inbound
          - name: SCHOOLNUM
            rule: "OtherIdList/OtherId[@Type='ZZ'+]=SCHOOL:$(SCHOOLNUM)"
            direction: outbound
          - name: NICKNAME
            rule: "Name[@Type='07']/FirstName"
            sif_version: "+2.0"
    scopes:
      - id: MA
        zones: MA_ZONE
        objects:
          - object: StudentPersonal
            fields:
              - { name: FIRSTNAME, rule: "Name[@Type='04']/PreferredName" }
"#;

pub fn student_rules() -> (Mappings, ScopeId) {
    let mappings = Mappings::from_yaml_str(STUDENT_RULES).expect("fixture rules load");
    let default = mappings.find("Default").expect("fixture has a Default scope");
    (mappings, default)
}

/// A fully populated student record
pub fn student_record() -> StringMapAdaptor {
    [
        ("FIRSTNAME", "Betty"),
        ("LASTNAME", "Boop"),
        ("BIRTHDATE", "1981-10-20"),
        ("GENDER", "2"),
        ("ACTIVE", "true"),
        ("GRADE", "09"),
        ("SCHOOLNUM", "998"),
        ("NICKNAME", "Bee"),
    ]
    .into_iter()
    .collect()
}

/// Text at a path inside `root`
pub fn value_at(root: &Element, path: &str) -> Option<String> {
    let expr = xpath::parse(path).expect("test path parses");
    xpath::select_value(root, &expr)
}
