//! Minimal owned XML tree.
//!
//! Elements keep their qualified names (`w:p`) and attributes verbatim so a
//! part serialises back to equivalent markup. Declarations, comments and
//! processing instructions are carried as raw events.

use super::DocxError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Raw(Event<'static>),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// True when this node is an element with the given local name.
    pub fn is_element(&self, local: &str) -> bool {
        self.as_element().is_some_and(|e| e.is(local))
    }
}

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    /// Attribute value looked up by local name, ignoring the prefix.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local(key) == local_name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local_name))
    }

    /// Concatenated character data of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Builds a qualified name reusing a namespace prefix.
pub fn qualified(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local_name),
        None => local_name.to_string(),
    }
}

/// A parsed XML part: prolog, root element and anything trailing it.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn parse(source: &str) -> Result<Self, DocxError> {
        let mut reader = Reader::from_str(source.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        let mut nodes = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let node = match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(element_from_start(&e)?);
                    continue;
                }
                Ok(Event::End(e)) => {
                    let element = stack.pop().ok_or_else(|| {
                        DocxError::Xml(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    XmlNode::Element(element)
                }
                Ok(Event::Empty(e)) => XmlNode::Element(element_from_start(&e)?),
                Ok(Event::Text(e)) => XmlNode::Text(
                    e.unescape()
                        .map_err(|err| DocxError::Xml(format!("invalid text content: {}", err)))?
                        .into_owned(),
                ),
                Ok(Event::Eof) => break,
                Ok(other) => XmlNode::Raw(other.into_owned()),
                Err(e) => {
                    return Err(DocxError::Xml(format!(
                        "{} at byte {}",
                        e,
                        reader.error_position()
                    )))
                }
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(DocxError::Xml(format!("unclosed element <{}>", open.name)));
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(XmlNode::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, DocxError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DocxError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| DocxError::Xml(format!("invalid attribute value: {}", e)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), DocxError> {
    let result = match node {
        XmlNode::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if element.children.is_empty() {
                writer.write_event(Event::Empty(start))
            } else {
                writer
                    .write_event(Event::Start(start))
                    .map_err(|e| DocxError::Xml(e.to_string()))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
            }
        }
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
        XmlNode::Raw(event) => writer.write_event(event.clone()),
    };
    result.map_err(|e| DocxError::Xml(e.to_string()))
}
