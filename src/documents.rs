//! XML document handling
//!
//! An owned element tree built with quick-xml. Unlike a plain data tree it
//! keeps mixed content faithfully: every element carries the text before its
//! first child (`text`) and the text between its end tag and the next sibling
//! (`tail`). The fill-in question transformation depends on both.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text before the first child element
    pub text: Option<String>,
    /// Text following this element's end tag inside the parent
    pub tail: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace scope in effect for this element
    pub namespaces: NamespaceContext,
    /// 1-based line of the start tag
    pub line: usize,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            tail: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
            line: 1,
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an unqualified attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.namespace.is_none() && qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find child elements by local name
    pub fn find_children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |e| e.local_name() == local_name)
    }

    /// First child element with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.local_name() == local_name)
    }

    /// True if any text or tail directly inside this element is not whitespace
    pub fn has_character_content(&self) -> bool {
        let significant = |t: &Option<String>| t.as_deref().is_some_and(|t| !t.trim().is_empty());
        significant(&self.text) || self.children.iter().any(|c| significant(&c.tail))
    }

    /// Append character data at the current insertion point
    fn push_text(&mut self, content: &str) {
        let slot = match self.children.last_mut() {
            Some(last) => &mut last.tail,
            None => &mut self.text,
        };
        slot.get_or_insert_with(String::new).push_str(content);
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from a string
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut lines = LineTracker::new(xml);
        let mut root: Option<Element> = None;
        let mut element_stack: Vec<Element> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                Error::Xml(format!("line {}: {}", lines.line_at(reader.buffer_position()), e))
            })?;

            match event {
                Event::Start(e) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let parent_scope = element_stack.last().map(|p| &p.namespaces);
                    let element = Self::parse_element(&e, parent_scope, lines.line_at(position), limits)?;
                    if element_stack.is_empty() && root.is_some() {
                        return Err(Error::Xml(format!(
                            "line {}: extra content after the root element",
                            element.line
                        )));
                    }
                    element_stack.push(element);
                }
                Event::Empty(e) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let parent_scope = element_stack.last().map(|p| &p.namespaces);
                    let element = Self::parse_element(&e, parent_scope, lines.line_at(position), limits)?;
                    Self::attach(&mut element_stack, &mut root, element)?;
                }
                Event::End(_) => {
                    if let Some(current) = element_stack.pop() {
                        Self::attach(&mut element_stack, &mut root, current)?;
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| {
                        Error::Xml(format!("line {}: {}", lines.line_at(position), e))
                    })?;
                    Self::append_text(&mut element_stack, &text, lines.line_at(position))?;
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e).map_err(|e| {
                        Error::Xml(format!("line {}: invalid CDATA: {}", lines.line_at(position), e))
                    })?;
                    Self::append_text(&mut element_stack, text, lines.line_at(position))?;
                }
                Event::Eof => break,
                _ => {} // Declarations, comments, processing instructions, doctype
            }
        }

        if let Some(open) = element_stack.last() {
            return Err(Error::Xml(format!(
                "line {}: element '{}' is not closed",
                open.line,
                open.local_name()
            )));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    /// Hand a finished element to its parent, or make it the root
    fn attach(
        stack: &mut [Element],
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.add_child(element),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(Error::Xml(format!(
                    "line {}: extra content after the root element",
                    element.line
                )))
            }
        }
        Ok(())
    }

    fn append_text(stack: &mut [Element], text: &str, line: usize) -> Result<()> {
        match stack.last_mut() {
            Some(current) => current.push_text(text),
            None if text.trim().is_empty() => {}
            None => {
                return Err(Error::Xml(format!(
                    "line {}: text outside of the root element",
                    line
                )))
            }
        }
        Ok(())
    }

    /// Parse element from BytesStart event
    fn parse_element(
        start: &BytesStart,
        parent_scope: Option<&NamespaceContext>,
        line: usize,
        limits: &Limits,
    ) -> Result<Element> {
        let mut namespaces = parent_scope.cloned().unwrap_or_default();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("line {}: failed to parse attribute: {}", line, e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("line {}: invalid attribute name: {}", line, e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("line {}: invalid attribute value: {}", line, e)))?
                .to_string();

            // Namespace declarations go into scope, not into the attribute map
            if attr_name == "xmlns" {
                namespaces.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("line {}: invalid element name: {}", line, e)))?
            .to_string();
        let qname = namespaces
            .resolve(&name)
            .map_err(|e| Error::Xml(format!("line {}: {}", line, e)))?;

        let mut element = Element::new(qname);
        element.line = line;
        for (attr_name, attr_value) in raw_attributes {
            let attr_qname = namespaces
                .resolve_attribute(&attr_name)
                .map_err(|e| Error::Xml(format!("line {}: {}", line, e)))?;
            if element.attributes.insert(attr_qname, attr_value).is_some() {
                return Err(Error::Xml(format!(
                    "line {}: duplicate attribute '{}'",
                    line, attr_name
                )));
            }
        }
        element.namespaces = namespaces;

        Ok(element)
    }
}

/// Maps byte offsets to 1-based line numbers; offsets must not decrease
struct LineTracker<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.input.len());
        if position > self.offset {
            self.line += self.input[self.offset..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = position;
        }
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root;
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.get_attribute("attr1"), Some("value1"));
        assert_eq!(doc.root.get_attribute("attr2"), Some("value2"));
        assert_eq!(doc.root.get_attribute("missing"), None);
    }

    #[test]
    fn test_namespaces_are_resolved() {
        let xml = r#"<m:questions xmlns:m="urn:q"><m:option/><plain/></m:questions>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.namespace(), Some("urn:q"));
        assert_eq!(doc.root.children[0].qname, QName::namespaced("urn:q", "option"));
        assert_eq!(doc.root.children[1].namespace(), None);
    }

    #[test]
    fn test_default_namespace_is_inherited() {
        let xml = r#"<questions xmlns="urn:q"><text>hi</text></questions>"#;
        let doc = Document::from_string(xml).unwrap();
        assert_eq!(doc.root.children[0].namespace(), Some("urn:q"));
    }

    #[test]
    fn test_text_and_tail_are_kept() {
        let xml = "<fill-in-text>Paris is the <fill><alt>capital</alt></fill> of France.</fill-in-text>";
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.text.as_deref(), Some("Paris is the "));
        assert_eq!(doc.root.children[0].tail.as_deref(), Some(" of France."));
        assert_eq!(doc.root.children[0].children[0].text.as_deref(), Some("capital"));
        assert!(doc.root.has_character_content());
    }

    #[test]
    fn test_found_child_outlives_the_name() {
        let doc = Document::from_string("<mapping><left>a</left><right>b</right></mapping>").unwrap();
        let found = {
            let side = String::from("right");
            doc.root.find_child(&side)
        };
        assert_eq!(found.and_then(|e| e.text.as_deref()), Some("b"));
        assert!(doc.root.find_child("middle").is_none());
        assert_eq!(doc.root.find_children("left").count(), 1);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let xml = "<text>a &lt; b &amp;&amp; c &gt; d</text>";
        let doc = Document::from_string(xml).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("a < b && c > d"));
    }

    #[test]
    fn test_cdata_is_text() {
        let xml = "<text><![CDATA[1 < 2]]></text>";
        let doc = Document::from_string(xml).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("1 < 2"));
    }

    #[test]
    fn test_line_numbers() {
        let xml = "<?xml version=\"1.0\"?>\n<root>\n  <a/>\n\n  <b>x</b>\n</root>";
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.line, 2);
        assert_eq!(doc.root.children[0].line, 3);
        assert_eq!(doc.root.children[1].line, 5);
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(Document::from_string("").is_err());
        assert!(Document::from_string("<a><b></a>").is_err());
        assert!(Document::from_string("<a>").is_err());
        assert!(Document::from_string("<a/><b/>").is_err());
        assert!(Document::from_string("<a/>junk").is_err());
        assert!(Document::from_string("<p:a/>").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        let err = Document::parse_with_limits("<a><b><c/></b></a>", &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }
}
