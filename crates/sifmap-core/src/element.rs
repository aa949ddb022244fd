//! In-memory XML element tree
//!
//! `Element` is the hierarchical data object the mapping engine reads from and
//! writes to. Names are stored as written; lookups compare local names so that
//! namespace prefixes do not affect path resolution.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::{Error, Result};

/// A single XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

/// Strip a namespace prefix from a qualified name
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.text = Some(text.into());
        element
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| local_name(k) == local_name(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| local_name(k) == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn clear_text(&mut self) {
        self.text = None;
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// Children whose local name matches
    pub fn children_named<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children_named(name).next()
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.local_name() == name)
    }

    /// Append a child and return a handle to it
    pub fn add_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.text.is_none() && self.children.is_empty()
    }

    /// Parse an XML document; the document element becomes the returned element
    pub fn from_xml(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;
            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| Error::xml(e.to_string()))?;
                    // indentation between elements
                    if !value.trim().is_empty() {
                        append_text(&mut stack, &value);
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    append_text(&mut stack, &value);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::xml("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::xml(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        root.ok_or_else(|| Error::xml("document has no root element"))
    }

    /// Serialize this element as indented XML
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::xml(e.to_string()))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::xml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn append_text(stack: &mut [Element], value: &str) {
    if let Some(current) = stack.last_mut() {
        match current.text.as_mut() {
            Some(existing) => existing.push_str(value),
            None => current.text = Some(value.to_string()),
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::xml("document has more than one root element")),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::xml(e.to_string()))?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::xml(e.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENT: &str = r#"<StudentPersonal RefId="D3E34B359D75101A8C3D00AA001A1652" xmlns="http://www.sifinfo.org/infrastructure/2.x">
  <Name Type="04">
    <LastName>Smith</LastName>
    <FirstName>Fred &amp; Co</FirstName>
  </Name>
  <OtherIdList>
    <OtherId Type="06">GRADE:09</OtherId>
  </OtherIdList>
</StudentPersonal>"#;

    #[test]
    fn test_parse_document() {
        let root = Element::from_xml(STUDENT).unwrap();
        assert_eq!(root.name(), "StudentPersonal");
        assert_eq!(root.attribute("RefId"), Some("D3E34B359D75101A8C3D00AA001A1652"));
        assert_eq!(root.attribute("xmlns"), None);

        let name = root.child("Name").unwrap();
        assert_eq!(name.attribute("Type"), Some("04"));
        assert_eq!(name.child("FirstName").unwrap().text(), Some("Fred & Co"));
        assert_eq!(
            root.child("OtherIdList").unwrap().child("OtherId").unwrap().text(),
            Some("GRADE:09")
        );
    }

    #[test]
    fn test_round_trip_through_xml() {
        let root = Element::from_xml(STUDENT).unwrap();
        let xml = root.to_xml().unwrap();
        assert!(xml.contains("<FirstName>Fred &amp; Co</FirstName>"));
        assert_eq!(Element::from_xml(&xml).unwrap(), root);
    }

    #[test]
    fn test_padded_text_survives_round_trip() {
        let element = Element::new("StudentPersonal")
            .with_child(Element::with_text("Name", "  Betty "))
            .with_child(Element::new("Demographics").with_child(Element::with_text("Gender", "F")));

        let parsed = Element::from_xml(&element.to_xml().unwrap()).unwrap();
        assert_eq!(parsed.child("Name").unwrap().text(), Some("  Betty "));
        assert_eq!(parsed.text(), None);
        assert_eq!(parsed.child("Demographics").unwrap().text(), None);
        assert_eq!(parsed, element);
    }

    #[test]
    fn test_empty_element_written_self_closing() {
        let element = Element::new("Demographics").with_child(Element::new("CountryOfBirth"));
        let xml = element.to_xml().unwrap();
        assert!(xml.contains("<CountryOfBirth/>"));
    }

    #[test]
    fn test_prefixed_names_match_local_name() {
        let root = Element::from_xml("<sif:Student><sif:Name>x</sif:Name></sif:Student>").unwrap();
        assert_eq!(root.local_name(), "Student");
        assert_eq!(root.child("Name").unwrap().text(), Some("x"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(Element::from_xml("<a><b></a>"), Err(Error::Xml { .. })));
        assert!(matches!(Element::from_xml(""), Err(Error::Xml { .. })));
        assert!(matches!(Element::from_xml("<a/><b/>"), Err(Error::Xml { .. })));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = Element::new("OtherId").with_attribute("Type", "06");
        element.set_attribute("Type", "ZZ");
        assert_eq!(element.attribute("Type"), Some("ZZ"));
        assert_eq!(element.attributes().count(), 1);
        assert_eq!(element.remove_attribute("Type"), Some("ZZ".to_string()));
        assert!(element.is_empty());
    }
}
