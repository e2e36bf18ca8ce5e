//! Minimal owned XML element tree
//!
//! Both output stages build [`Element`] trees. Persisted documents are read
//! back with `roxmltree` and written with `quick-xml`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// An XML element with attributes, optional text and child elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Text element that is left empty when `text` is `None`
    pub fn leaf(name: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            name: name.into(),
            text: text.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert or replace an attribute, keeping first-insertion order
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// Has nested elements
    pub fn has_structure(&self) -> bool {
        !self.children.is_empty()
    }

    /// No nested elements and no text
    pub fn is_empty_leaf(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Element> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Element {
        let text: String = node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect();

        Element {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            // whitespace-only text is indentation between child elements
            text: (!text.trim().is_empty()).then_some(text),
            children: node
                .children()
                .filter(|c| c.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Serialize as an indented document with an XML declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.write(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.is_empty_leaf() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Element {
        Element::new("member")
            .with_attr("name", "Count")
            .with_attr("type", "property")
            .with_child(Element::new("returns").with_child(Element::leaf("type", Some("long"))))
            .with_child(Element::leaf("description", None))
            .with_child(Element::leaf("syntax", Some("long Count(\n    a < b & c\n);")))
    }

    #[test]
    fn test_write_then_read_preserves_tree() {
        let xml = sample().to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("a &lt; b &amp; c"));
        assert!(xml.contains("<description/>"));
        assert_eq!(Element::parse(&xml).unwrap(), sample());
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("interface").with_attr("name", "IA").with_attr("version", "1");
        el.set_attr("name", "IB");
        assert_eq!(
            el.attributes,
            vec![("name".to_string(), "IB".to_string()), ("version".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_parse_ignores_layout_whitespace() {
        let el = Element::parse("<a x=\"1\">\n  <b>  text </b>\n  <c/>\n</a>").unwrap();
        assert_eq!(el.attr("x"), Some("1"));
        assert_eq!(el.text, None);
        assert_eq!(el.child_text("b"), Some("  text "));
        assert!(el.child("c").unwrap().is_empty_leaf());
    }

    #[test]
    fn test_leaf_whitespace_survives_round_trip() {
        let el = Element::new("member").with_child(Element::leaf("description", Some("  indented\n")));
        let parsed = Element::parse(&el.to_xml().unwrap()).unwrap();
        assert_eq!(parsed.child_text("description"), Some("  indented\n"));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(Element::parse("<a><b></a>").is_err());
    }
}
