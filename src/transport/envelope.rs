use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::transport::EnvelopeError;

/// XML element tree built before rendering.
///
/// Attributes keep insertion order; text and attribute values are escaped on render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    pub fn attribute(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    /// Add the attribute only when `value` is present.
    pub fn optional_attribute<V: Into<String>>(
        self,
        key: &'static str,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.attribute(key, value),
            None => self,
        }
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Render as a standalone document with an XML declaration.
    pub fn render(&self) -> Result<String, EnvelopeError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|err| EnvelopeError::Write(err.to_string()))?;
        write_element(&mut writer, self)?;

        String::from_utf8(writer.into_inner())
            .map_err(|err| EnvelopeError::Write(err.to_string()))
    }
}

#[cfg(test)]
impl XmlElement {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn child_elements(&self) -> &[XmlElement] {
        &self.children
    }
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), EnvelopeError> {
    let mut start = BytesStart::new(element.name);
    for (key, value) in &element.attributes {
        start.push_attribute((*key, value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|err| EnvelopeError::Write(err.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|err| EnvelopeError::Write(err.to_string()))?;
    if let Some(text) = element.text.as_deref() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|err| EnvelopeError::Write(err.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name)))
        .map_err(|err| EnvelopeError::Write(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_declaration_attributes_and_children_in_order() {
        let doc = XmlElement::new("Root")
            .attribute("B", "2")
            .attribute("A", "1")
            .child(XmlElement::with_text("Item", "first"))
            .child(XmlElement::with_text("Item", "second"));

        assert_eq!(doc.name(), "Root");
        assert_eq!(doc.text(), None);
        assert_eq!(doc.child_elements()[1].text(), Some("second"));
        assert_eq!(
            doc.render().unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Root B="2" A="1"><Item>first</Item><Item>second</Item></Root>"#
        );
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let doc = XmlElement::with_text("Message", "a < b & c").attribute("Sender", "R&D");
        assert_eq!(
            doc.render().unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Message Sender="R&amp;D">a &lt; b &amp; c</Message>"#
        );
    }

    #[test]
    fn optional_attribute_is_skipped_when_absent() {
        let doc = XmlElement::new("Request")
            .attribute("Type", "high")
            .optional_attribute("CustomID", None::<String>)
            .optional_attribute("Sender", Some("Shop"));

        assert_eq!(
            doc.attributes(),
            &[("Type", "high".to_owned()), ("Sender", "Shop".to_owned())]
        );
        assert_eq!(
            doc.render().unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Request Type="high" Sender="Shop"/>"#
        );
    }
}
