//! Path resolution and creation against an element tree
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use super::ast::{PathExpr, Predicate, Step};
use super::error::PathError;
use crate::element::Element;

/// A settable location produced by [`create`]
#[derive(Debug)]
pub enum NodeTarget<'a> {
    /// The text content of an element
    Text(&'a mut Element),
    /// A named attribute of an element
    Attribute(&'a mut Element, String),
}

impl<'a> NodeTarget<'a> {
    /// Current value at the target, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            NodeTarget::Text(element) => element.text(),
            NodeTarget::Attribute(element, name) => element.attribute(name),
        }
    }

    pub fn has_value(&self) -> bool {
        self.value().is_some()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        match self {
            NodeTarget::Text(element) => element.set_text(value),
            NodeTarget::Attribute(element, name) => element.set_attribute(name.as_str(), value),
        }
    }

    /// The element holding the target
    pub fn element(&self) -> &Element {
        match self {
            NodeTarget::Text(element) | NodeTarget::Attribute(element, _) => element,
        }
    }
}

/// Steps to walk from `root`, skipping a leading step that names the root itself
fn relative_steps<'p>(root: &Element, path: &'p PathExpr) -> Option<&'p [Step]> {
    match path.steps.first() {
        Some(first) if path.absolute => {
            if first.name == root.local_name() && first.predicates.iter().all(|p| matches(root, p)) {
                Some(&path.steps[1..])
            } else {
                None
            }
        }
        _ => Some(&path.steps),
    }
}

fn matches(element: &Element, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Attribute { name, value } => element.attribute(name) == Some(value.as_str()),
        Predicate::Child { name, value } => element
            .children_named(name)
            .any(|c| c.text().unwrap_or_default() == value),
        Predicate::Position(_) => true,
    }
}

fn step_matches(element: &Element, step: &Step) -> bool {
    element.local_name() == step.name && step.predicates.iter().all(|p| matches(element, p))
}

/// Index of the child selected by `step`, honoring a positional predicate
fn find_child(parent: &Element, step: &Step) -> Option<usize> {
    let position = step.position().unwrap_or(1);
    parent
        .children()
        .iter()
        .enumerate()
        .filter(|(_, c)| step_matches(c, step))
        .nth(position.saturating_sub(1))
        .map(|(i, _)| i)
}

/// New element satisfying the step's value predicates
fn new_step_element(step: &Step) -> Element {
    let mut element = Element::new(step.name.as_str());
    for predicate in &step.predicates {
        match predicate {
            Predicate::Attribute { name, value } => element.set_attribute(name.as_str(), value.as_str()),
            Predicate::Child { name, value } => {
                element.add_child(Element::with_text(name.as_str(), value.as_str()));
            }
            Predicate::Position(_) => {}
        }
    }
    element
}

/// Resolve a path to the element it addresses
pub fn select<'a>(root: &'a Element, path: &PathExpr) -> Option<&'a Element> {
    let steps = relative_steps(root, path)?;
    let mut current = root;
    for step in steps {
        let index = find_child(current, step)?;
        current = &current.children()[index];
    }
    Some(current)
}

/// Resolve a path to its text or attribute value
pub fn select_value(root: &Element, path: &PathExpr) -> Option<String> {
    let element = select(root, path)?;
    match &path.attribute {
        Some(attribute) => element.attribute(attribute).map(str::to_string),
        None => element.text().map(str::to_string),
    }
}

/// Resolve a path for writing, creating missing elements along the way
pub fn create<'a>(root: &'a mut Element, path: &PathExpr) -> Result<NodeTarget<'a>, PathError> {
    let steps = relative_steps(root, path).ok_or_else(|| {
        PathError::invalid_path(
            format!("absolute path does not start at <{}>", root.local_name()),
            path.to_string(),
        )
    })?;

    let mut current = root;
    for step in steps {
        let index = if step.create_new {
            current.children_mut().push(new_step_element(step));
            current.children().len() - 1
        } else {
            match find_child(current, step) {
                Some(index) => index,
                None => {
                    let wanted = step.position().unwrap_or(1);
                    let existing = current.children().iter().filter(|c| step_matches(c, step)).count();
                    for _ in existing..wanted {
                        current.children_mut().push(new_step_element(step));
                    }
                    current.children().len() - 1
                }
            }
        };
        current = &mut current.children_mut()[index];
    }

    Ok(match &path.attribute {
        Some(attribute) => NodeTarget::Attribute(current, attribute.clone()),
        None => NodeTarget::Text(current),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpath::parse;

    fn student() -> Element {
        Element::from_xml(
            r#"<StudentPersonal RefId="A1">
                 <Name Type="02"><FirstName>Freddy</FirstName></Name>
                 <Name Type="04"><FirstName>Fred</FirstName><LastName>Smith</LastName></Name>
                 <OtherIdList>
                   <OtherId Type="06">GRADE:09</OtherId>
                   <OtherId Type="ZZ">SCHOOL:12</OtherId>
                 </OtherIdList>
                 <Email><EmailType>Alt</EmailType><Address>a@x.org</Address></Email>
                 <Email><EmailType>Primary</EmailType><Address>p@x.org</Address></Email>
               </StudentPersonal>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_select_with_predicates() {
        let root = student();
        let value = |p: &str| select_value(&root, &parse(p).unwrap());

        assert_eq!(value("Name[@Type='04']/FirstName").as_deref(), Some("Fred"));
        assert_eq!(value("Name/FirstName").as_deref(), Some("Freddy"));
        assert_eq!(value("Name[2]/LastName").as_deref(), Some("Smith"));
        assert_eq!(value("OtherIdList/OtherId[@Type='ZZ']").as_deref(), Some("SCHOOL:12"));
        assert_eq!(value("Email[EmailType='Primary']/Address").as_deref(), Some("p@x.org"));
        assert_eq!(value("@RefId").as_deref(), Some("A1"));
        assert_eq!(value("/StudentPersonal/@RefId").as_deref(), Some("A1"));
        assert_eq!(value("Name[@Type='01']/FirstName"), None);
        assert_eq!(value("/StaffPersonal/@RefId"), None);
    }

    #[test]
    fn test_create_missing_structure() {
        let mut root = Element::new("StudentPersonal");
        let path = parse("Name[@Type='04']/FirstName").unwrap();
        {
            let mut target = create(&mut root, &path).unwrap();
            assert!(!target.has_value());
            target.set_value("Fred");
        }
        assert_eq!(root.child("Name").unwrap().attribute("Type"), Some("04"));
        assert_eq!(select_value(&root, &path).as_deref(), Some("Fred"));

        // second create reuses the matching element
        let last = parse("Name[@Type='04']/LastName").unwrap();
        create(&mut root, &last).unwrap().set_value("Smith");
        assert_eq!(root.children_named("Name").count(), 1);
    }

    #[test]
    fn test_create_new_always_appends() {
        let mut root = student();
        let path = parse("OtherIdList/OtherId[@Type='ZZ'+]").unwrap();
        let mut target = create(&mut root, &path).unwrap();
        assert!(!target.has_value());
        target.set_value("SCHOOL:99");

        let list = root.child("OtherIdList").unwrap();
        assert_eq!(list.children_named("OtherId").count(), 3);
        assert_eq!(list.children()[2].text(), Some("SCHOOL:99"));
    }

    #[test]
    fn test_create_positional_pads() {
        let mut root = Element::new("StudentAddressList");
        create(&mut root, &parse("Address[3]/City").unwrap())
            .unwrap()
            .set_value("Boston");
        assert_eq!(root.children_named("Address").count(), 3);
        assert_eq!(
            select_value(&root, &parse("Address[3]/City").unwrap()).as_deref(),
            Some("Boston")
        );
    }

    #[test]
    fn test_create_attribute_and_child_predicate() {
        let mut root = Element::new("StudentPersonal");
        create(&mut root, &parse("Email[EmailType='Primary']/Address").unwrap())
            .unwrap()
            .set_value("p@x.org");
        assert_eq!(
            root.child("Email").unwrap().child("EmailType").unwrap().text(),
            Some("Primary")
        );

        create(&mut root, &parse("@RefId").unwrap()).unwrap().set_value("B2");
        assert_eq!(root.attribute("RefId"), Some("B2"));
    }

    #[test]
    fn test_create_rejects_foreign_root() {
        let mut root = Element::new("StudentPersonal");
        let err = create(&mut root, &parse("/StaffPersonal/Name").unwrap()).unwrap_err();
        assert!(matches!(err, PathError::InvalidPath { .. }));
    }
}
