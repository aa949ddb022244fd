//! Tests for the rule tree

use super::*;
use crate::error::DefinitionKind;
use crate::field_rule::FieldRule;
use crate::object_mapping::ObjectMapping;
use crate::rule::Rule;
use crate::valueset::ValueSet;
use crate::version::SifVersion;
use crate::Error;
use pretty_assertions::assert_eq;

/// Default
///   MA        zones MA_ZONE
///     Boston  zones BOSTON_ZONE, sources BOSTON_SIS
///   NH        zones NH_ZONE, versions 1.5r1
fn district_tree() -> (Mappings, ScopeId) {
    let mut mappings = Mappings::new();
    let root = mappings.root();
    let default = mappings.add_child(root, "Default").unwrap();
    let ma = mappings.add_child(default, "MA").unwrap();
    let boston = mappings.add_child(ma, "Boston").unwrap();
    let nh = mappings.add_child(default, "NH").unwrap();

    mappings.scope_mut(ma).unwrap().set_zones(parse_filter_list("MA_ZONE"));
    let scope = mappings.scope_mut(boston).unwrap();
    scope.set_zones(parse_filter_list("BOSTON_ZONE"));
    scope.set_sources(parse_filter_list("BOSTON_SIS"));
    let scope = mappings.scope_mut(nh).unwrap();
    scope.set_zones(parse_filter_list("NH_ZONE"));
    scope.set_versions_text("1.5r1").unwrap();

    (mappings, default)
}

fn id_of(mappings: &Mappings, node: ScopeId) -> Option<&str> {
    mappings.scope(node).and_then(Scope::id)
}

#[test]
fn test_select_most_specific_scope() {
    let (mappings, default) = district_tree();

    let selected = mappings.select(default, Some("MA_ZONE"), None, None).unwrap();
    assert_eq!(id_of(&mappings, selected), Some("MA"));

    let selected = mappings.select(default, Some("BOSTON_ZONE"), None, None).unwrap();
    assert_eq!(id_of(&mappings, selected), Some("Boston"));

    let selected = mappings
        .select(default, Some("BOSTON_ZONE"), Some("BOSTON_SIS"), None)
        .unwrap();
    assert_eq!(id_of(&mappings, selected), Some("Boston"));

    // Boston's own zone list rejects MA_ZONE
    let selected = mappings
        .select(default, Some("MA_ZONE"), Some("BOSTON_SIS"), None)
        .unwrap();
    assert_eq!(id_of(&mappings, selected), Some("MA"));

    let selected = mappings
        .select(default, Some("NH_ZONE"), None, Some(SifVersion::SIF15R1))
        .unwrap();
    assert_eq!(id_of(&mappings, selected), Some("NH"));
}

#[test]
fn test_select_falls_back_to_top_level() {
    let (mappings, default) = district_tree();

    assert_eq!(mappings.select(default, None, None, None).unwrap(), default);
    assert_eq!(
        mappings.select(default, Some("VT_ZONE"), None, None).unwrap(),
        default
    );
    // NH rejects 2.0, MA and Boston reject the zone
    let selected = mappings
        .select(default, Some("NH_ZONE"), None, Some(SifVersion::SIF20))
        .unwrap();
    assert_eq!(selected, default);
}

#[test]
fn test_select_tie_goes_to_last_candidate() {
    let mut mappings = Mappings::new();
    let default = mappings.add_child(mappings.root(), "Default").unwrap();
    for id in ["First", "Second"] {
        let child = mappings.add_child(default, id).unwrap();
        mappings.scope_mut(child).unwrap().set_zones(parse_filter_list("Z"));
    }

    let selected = mappings.select(default, Some("Z"), None, None).unwrap();
    assert_eq!(id_of(&mappings, selected), Some("Second"));
}

#[test]
fn test_select_misuse() {
    let (mappings, default) = district_tree();
    let ma = mappings.find("MA").unwrap();

    assert!(matches!(
        mappings.select(ma, Some("MA_ZONE"), None, None),
        Err(Error::SelectionMisuse { .. })
    ));
    assert!(matches!(
        mappings.select(mappings.root(), None, None, None),
        Err(Error::SelectionMisuse { .. })
    ));

    let mut leaf = Mappings::new();
    let only = leaf.add_child(leaf.root(), "Only").unwrap();
    assert_eq!(leaf.select(only, Some("ANY"), None, None).unwrap(), only);
    assert!(mappings.select(default, None, None, None).is_ok());
}

#[test]
fn test_inherited_filters() {
    let (mappings, _) = district_tree();
    let boston = mappings.find("Boston").unwrap();
    let nh = mappings.find("NH").unwrap();

    let ma = mappings.find("MA").unwrap();

    assert_eq!(mappings.allows_zone(boston, "BOSTON_ZONE"), 1);
    assert_eq!(mappings.allows_zone(boston, "MA_ZONE"), -1);
    assert_eq!(mappings.allows_zone(ma, "MA_ZONE"), 1);
    assert_eq!(mappings.allows_source(ma, "BOSTON_SIS"), 0);
    assert_eq!(mappings.allows_version(boston, SifVersion::SIF20), 0);
    assert_eq!(mappings.allows_version(nh, SifVersion::SIF15R1), 1);
    assert_eq!(mappings.allows_source(nh, "BOSTON_SIS"), 0);
}

#[test]
fn test_scope_ids_and_structure() {
    let (mut mappings, default) = district_tree();
    let root = mappings.root();

    assert!(matches!(
        mappings.add_child(default, "MA"),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::Scope, .. })
    ));
    assert!(matches!(
        mappings.add_child(default, " "),
        Err(Error::Configuration { .. })
    ));

    // same id under a different parent is fine
    let ma = mappings.find("MA").unwrap();
    assert!(mappings.add_child(ma, "NH").is_ok());

    assert_eq!(mappings.top_level(), &[default]);
    let order: Vec<_> = mappings
        .descendants(root)
        .into_iter()
        .filter_map(|n| id_of(&mappings, n))
        .collect();
    assert_eq!(order, vec!["Default", "MA", "Boston", "NH", "NH"]);
    assert_eq!(mappings.find("NH"), mappings.child_by_id(ma, "NH"));

    let existing = mappings.find_or_create(default, "MA").unwrap();
    assert_eq!(existing, ma);
    let created = mappings.find_or_create(default, "VT").unwrap();
    assert_eq!(id_of(&mappings, created), Some("VT"));
}

#[test]
fn test_remove_child_drops_subtree() {
    let (mut mappings, default) = district_tree();
    let before = mappings.len();

    assert!(mappings.remove_child(default, "MA").unwrap());
    assert!(!mappings.remove_child(default, "MA").unwrap());
    assert_eq!(mappings.len(), before - 2);
    assert_eq!(mappings.find("Boston"), None);
}

#[test]
fn test_inherited_rules_values_and_properties() {
    let (mut mappings, default) = district_tree();
    let boston = mappings.find("Boston").unwrap();

    let scope = mappings.scope_mut(default).unwrap();
    scope.set_property("district", "Commonwealth");
    let mut rules = ObjectMapping::new("StudentPersonal");
    rules
        .add_rule(FieldRule::new("FIRST", Rule::path("Name/FirstName")).unwrap())
        .unwrap();
    rules
        .add_rule(FieldRule::new("LAST", Rule::path("Name/LastName")).unwrap())
        .unwrap();
    scope.add_object_mapping(rules).unwrap();
    let mut set = ValueSet::new("Gender");
    set.define(Some("M"), "Male", None);
    scope.add_value_set(set).unwrap();

    let scope = mappings.scope_mut(boston).unwrap();
    scope.set_property("district", "Boston Public");
    scope
        .object_mapping_or_insert("StudentPersonal")
        .add_rule(FieldRule::new("LAST", Rule::path("Name/Surname")).unwrap())
        .unwrap();

    let rules = mappings.rules_for(boston, "StudentPersonal", true);
    let paths: Vec<_> = rules.iter().map(|r| r.rule().to_string()).collect();
    assert_eq!(paths, vec!["Name/Surname", "Name/FirstName"]);
    assert_eq!(mappings.rules_for(boston, "StudentPersonal", false).len(), 1);

    assert!(mappings.value_set(boston, "Gender", true).is_some());
    assert!(mappings.value_set(boston, "Gender", false).is_none());
    assert_eq!(mappings.property(boston, "district", true), Some("Boston Public"));
    let ma = mappings.find("MA").unwrap();
    assert_eq!(mappings.property(ma, "district", true), Some("Commonwealth"));
    assert_eq!(mappings.property(ma, "district", false), None);
    assert!(mappings.object_mapping(ma, "StudentPersonal", true).is_some());
    assert!(mappings.object_mapping(ma, "StaffPersonal", true).is_none());
}

#[test]
fn test_duplicate_rule_sets_and_value_sets() {
    let mut mappings = Mappings::new();
    let default = mappings.add_child(mappings.root(), "Default").unwrap();
    let scope = mappings.scope_mut(default).unwrap();

    scope.add_object_mapping(ObjectMapping::new("StudentPersonal")).unwrap();
    assert!(matches!(
        scope.add_object_mapping(ObjectMapping::new("StudentPersonal")),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::ObjectRules, .. })
    ));
    scope.add_value_set(ValueSet::new("Grades")).unwrap();
    assert!(matches!(
        scope.add_value_set(ValueSet::new("Grades")),
        Err(Error::DuplicateDefinition { kind: DefinitionKind::ValueSet, .. })
    ));
    assert!(scope.remove_value_set("Grades").is_some());
    assert!(scope.add_value_set(ValueSet::new("Grades")).is_ok());
}

#[test]
fn test_copy_subtree() {
    let (mut mappings, default) = district_tree();
    let root = mappings.root();
    let ma = mappings.find("MA").unwrap();
    mappings.scope_mut(ma).unwrap().set_property("state", "MA");

    let copy = mappings.copy_subtree(ma, root, "Massachusetts").unwrap();
    let copied = mappings.scope(copy).unwrap();
    assert_eq!(copied.zones(), Some(&["MA_ZONE".to_string()][..]));
    assert_eq!(copied.property("state"), Some("MA"));
    assert_eq!(copied.parent(), Some(root));

    let boston_copy = mappings.child_by_id(copy, "Boston").unwrap();
    assert_ne!(Some(boston_copy), mappings.find("Boston"));
    assert_eq!(
        mappings.scope(boston_copy).unwrap().sources(),
        Some(&["BOSTON_SIS".to_string()][..])
    );

    // the copy is independent of the original
    mappings.scope_mut(copy).unwrap().set_property("state", "Bay State");
    assert_eq!(mappings.property(ma, "state", false), Some("MA"));

    assert!(matches!(
        mappings.copy_subtree(default, ma, "Loop"),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_filter_lists() {
    assert_eq!(parse_filter_list("A, B ,C"), Some(vec!["A".into(), "B".into(), "C".into()]));
    assert_eq!(parse_filter_list("A,*"), None);
    assert_eq!(parse_filter_list(" , "), None);
}
