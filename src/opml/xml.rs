//! Generic XML node tree built from `quick-xml` pull events.
//!
//! The tree is a closed set of node variants decided at parse time, so the
//! OPML layer only ever matches on [`XmlNode::Element`] and never has to
//! inspect node kinds at runtime. Nodes live in a flat arena in document
//! (pre-)order and refer to their children by [`NodeId`], so neither building,
//! searching nor dropping a document recurses, however deep the nesting.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::OpmlError;

/// Index of a node in its [`Document`].
pub type NodeId = usize;

/// A single node of a parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    /// Unescaped character data (CDATA sections included).
    Text(String),
    Comment(String),
    /// XML declaration, processing instruction or doctype.
    Other,
}

/// An XML element with its attributes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<NodeId>,
}

impl Element {
    /// Looks up an attribute by exact (case-sensitive) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Every node, in document order.
    nodes: Vec<XmlNode>,
    /// Top-level nodes: prolog, the root element, trailing comments.
    top_level: Vec<NodeId>,
}

impl Document {
    /// Parses `content` into a node tree.
    ///
    /// Fails with [`OpmlError::MalformedInput`] on syntax errors, mismatched or
    /// unclosed tags, undecodable attribute values, unknown entities, and
    /// content outside the single root element (a second top-level element or
    /// non-whitespace text). Comments, processing instructions and the doctype
    /// are allowed around the root.
    ///
    /// SEC-002: `quick-xml` never parses `<!ENTITY>` declarations. Only the five
    /// predefined entities and character references are resolved; anything else
    /// surfaces as an `EscapeError` and is reported as malformed input.
    pub fn parse(content: &str) -> Result<Self, OpmlError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut doc = Self::default();
        let mut open: Vec<NodeId> = Vec::new();
        let mut seen_root = false;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                OpmlError::malformed(format!(
                    "XML parse error at byte {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(e) => {
                    let element = start_element(&e, &reader)?;
                    let id = doc.insert_element(element, &open, &mut seen_root)?;
                    open.push(id);
                }
                Event::Empty(e) => {
                    let element = start_element(&e, &reader)?;
                    doc.insert_element(element, &open, &mut seen_root)?;
                }
                Event::End(e) => {
                    open.pop().ok_or_else(|| {
                        OpmlError::malformed(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| OpmlError::malformed(format!("invalid text content: {}", e)))?;
                    if open.is_empty() {
                        return Err(OpmlError::malformed("text outside the root element"));
                    }
                    doc.insert(XmlNode::Text(text.into_owned()), &open);
                }
                Event::CData(c) => {
                    if open.is_empty() {
                        return Err(OpmlError::malformed("CDATA outside the root element"));
                    }
                    let text = String::from_utf8_lossy(&c).into_owned();
                    doc.insert(XmlNode::Text(text), &open);
                }
                Event::Comment(c) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    doc.insert(XmlNode::Comment(text), &open);
                }
                Event::Eof => break,
                _ => {
                    doc.insert(XmlNode::Other, &open);
                }
            }
            buf.clear();
        }

        if let Some(&unclosed) = open.last() {
            let tag = doc.element(unclosed).map(|e| e.tag.as_str()).unwrap_or_default();
            return Err(OpmlError::malformed(format!("unclosed element <{}>", tag)));
        }

        Ok(doc)
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id)
    }

    /// Returns the element with the given id, if that node is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id) {
            Some(XmlNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Top-level nodes in document order.
    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    /// Iterates over the element children of `element`, skipping text,
    /// comments and the rest.
    pub fn child_elements<'a>(&'a self, element: &'a Element) -> impl Iterator<Item = &'a Element> {
        element.children.iter().filter_map(|&id| self.element(id))
    }

    /// Returns the first element named `tag` (case-sensitive) in document order.
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        // The arena is already in pre-order.
        self.nodes.iter().find_map(|node| match node {
            XmlNode::Element(element) if element.tag == tag => Some(element),
            _ => None,
        })
    }

    fn insert(&mut self, node: XmlNode, open: &[NodeId]) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        match open.last() {
            Some(&parent) => {
                if let Some(XmlNode::Element(parent)) = self.nodes.get_mut(parent) {
                    parent.children.push(id);
                }
            }
            None => self.top_level.push(id),
        }
        id
    }

    fn insert_element(
        &mut self,
        element: Element,
        open: &[NodeId],
        seen_root: &mut bool,
    ) -> Result<NodeId, OpmlError> {
        if open.is_empty() {
            if *seen_root {
                return Err(OpmlError::malformed(format!(
                    "element <{}> after the root element",
                    element.tag
                )));
            }
            *seen_root = true;
        }
        Ok(self.insert(XmlNode::Element(element), open))
    }
}

fn start_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, OpmlError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let decoder = reader.decoder();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| {
            OpmlError::malformed(format!("malformed attribute on <{}>: {}", tag, err))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(decoder).map_err(|err| {
            OpmlError::malformed(format!(
                "invalid value for attribute `{}` on <{}>: {}",
                key, tag, err
            ))
        })?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
    })
}
