//! JUnit XML document model
//!
//! Small ordered element tree over quick-xml events. Attribute order, child
//! order, comments, processing instructions and CDATA sections survive a
//! parse/serialise cycle. The XML declaration is always rewritten as
//! `<?xml version="1.0" encoding="UTF-8"?>`.
//!
//! Parsing applies XML end-of-line and attribute-value normalisation
//! before resolving references, so a literal newline in an attribute reads
//! as a space while `&#10;` reads as a newline. Serialising writes
//! whitespace that normalisation would destroy as character references.

use crate::report::ReportError;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// Node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data
    Text(String),
    CData(String),
    /// Raw comment content
    Comment(String),
    /// Raw processing instruction content
    ProcessingInstruction(String),
    /// Raw DOCTYPE content
    DocType(String),
}

/// XML element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    /// Unescaped attribute values, document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute in place, or append it
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with `name`
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// First child element with `name`, appended if absent
    pub fn child_or_insert(&mut self, name: &str) -> &mut Element {
        let position = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.name == name));
        let index = match position {
            Some(index) => index,
            None => {
                self.children.push(Node::Element(Element::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(e) => e,
            // position() only matched elements and push() added one
            _ => unreachable!("child index does not point at an element"),
        }
    }

    /// Concatenated text and CDATA content of direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append character data after the last text or CDATA child
    ///
    /// Extends a trailing text node in place; other children keep their
    /// positions and CDATA sections stay CDATA.
    pub fn append_text(&mut self, text: &str) {
        let last = self
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Text(_) | Node::CData(_)));
        match last {
            Some(index) => match &mut self.children[index] {
                Node::Text(existing) => existing.push_str(text),
                _ => self.children.insert(index + 1, Node::Text(text.to_string())),
            },
            None => self.children.push(Node::Text(text.to_string())),
        }
    }

    /// Depth-first, document-order visit of this element and descendants
    pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    pub fn visit<F: FnMut(&Element)>(&self, f: &mut F) {
        f(self);
        for child in self.elements() {
            child.visit(f);
        }
    }
}

/// Parsed report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    /// Top-level nodes; exactly one is the root element
    nodes: Vec<Node>,
}

impl ReportDocument {
    /// Document with a single root element
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node::Element(root)],
        }
    }

    pub fn parse(xml: &str) -> Result<Self, ReportError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut top: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => return Err(ReportError::Malformed("unexpected end tag".to_string())),
                },
                Event::Empty(start) => Node::Element(element_from_start(&start)?),
                Event::Text(text) => {
                    let raw = normalize_line_ends(&utf8(text.into_inner().into_owned())?);
                    Node::Text(unescape(&raw).map_err(quick_xml::Error::from)?.into_owned())
                }
                Event::CData(data) => Node::CData(utf8(data.into_inner().into_owned())?),
                Event::Comment(text) => Node::Comment(utf8(text.into_inner().into_owned())?),
                Event::PI(text) => Node::ProcessingInstruction(utf8(text.into_inner().into_owned())?),
                Event::DocType(text) => Node::DocType(utf8(text.into_inner().into_owned())?),
                Event::Decl(_) => continue,
                Event::Eof => break,
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(ReportError::Malformed(format!("unclosed element <{}>", open.name)));
        }
        // Whitespace between prolog items is not significant at top level
        top.retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
        let roots = top.iter().filter(|n| matches!(n, Node::Element(_))).count();
        if roots != 1 {
            return Err(ReportError::Malformed(format!(
                "expected one root element, found {}",
                roots
            )));
        }
        if top.iter().any(|n| matches!(n, Node::Text(_) | Node::CData(_))) {
            return Err(ReportError::Malformed("text outside the root element".to_string()));
        }
        Ok(Self { nodes: top })
    }

    pub fn root(&self) -> &Element {
        self.nodes
            .iter()
            .find_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("document always has a root element"))
    }

    pub fn root_mut(&mut self) -> &mut Element {
        self.nodes
            .iter_mut()
            .find_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("document always has a root element"))
    }

    /// Visit every `<testcase>` in document order
    pub fn for_each_testcase_mut<F: FnMut(&mut Element)>(&mut self, mut f: F) {
        self.root_mut().visit_mut(&mut |element: &mut Element| {
            if element.name == "testcase" {
                f(element);
            }
        });
    }

    /// All `<testcase>` elements in document order
    pub fn testcases(&self) -> Vec<&Element> {
        fn collect<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
            if element.name == "testcase" {
                out.push(element);
            }
            for child in element.elements() {
                collect(child, out);
            }
        }
        let mut out = Vec::new();
        collect(self.root(), &mut out);
        out
    }

    /// `<testcase>` addressed by `classname` / `name`
    pub fn find_testcase(&self, classname: &str, name: &str) -> Option<&Element> {
        self.testcases().into_iter().find(|tc| {
            tc.attribute("classname").unwrap_or_default() == classname
                && tc.attribute("name").unwrap_or_default() == name
        })
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, ReportError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        for node in &self.nodes {
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
            write_node(&mut writer, node)?;
        }
        writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        Ok(writer.into_inner())
    }

    pub fn to_xml_string(&self) -> Result<String, ReportError> {
        String::from_utf8(self.to_xml()?)
            .map_err(|e| ReportError::Malformed(format!("serialised report is not UTF-8: {}", e)))
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String, ReportError> {
    String::from_utf8(bytes).map_err(|e| ReportError::Malformed(format!("invalid UTF-8: {}", e)))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, ReportError> {
    let mut element = Element::new(utf8(start.name().as_ref().to_vec())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ReportError::Malformed(e.to_string()))?;
        let key = utf8(attribute.key.as_ref().to_vec())?;
        let raw = normalize_attribute_whitespace(&utf8(attribute.value.into_owned())?);
        let value = unescape(&raw).map_err(quick_xml::Error::from)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// `\r\n` and lone `\r` become `\n`
fn normalize_line_ends(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Literal whitespace in an attribute value reads as a single space each
fn normalize_attribute_whitespace(raw: &str) -> String {
    normalize_line_ends(raw).replace(['\n', '\t'], " ")
}

fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), ReportError> {
    match node {
        Node::Element(element) => write_element(writer, element)?,
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?
        }
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(raw) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
        }
        Node::ProcessingInstruction(raw) => {
            writer.write_event(Event::PI(BytesText::from_escaped(raw.as_str())))?
        }
        Node::DocType(raw) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))?
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ReportError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
