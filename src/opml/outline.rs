use super::xml::{Document, Element};
use super::OpmlError;

/// One `<outline>` element of an OPML body.
///
/// An item with an `xml_url` is a feed; anything else is a folder whose
/// `children` hold the nested outlines in document order. Feed items keep
/// any nested children the source carried, but nothing downstream reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineItem {
    /// Display label. Sourced from `text`, falling back to `title`, else empty.
    pub text: String,
    pub xml_url: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Whether this outline is a feed subscription rather than a folder.
    pub fn is_feed(&self) -> bool {
        self.xml_url.is_some()
    }
}

/// Tears nested children down with a work stack so dropping a deeply nested
/// tree never recurses.
impl Drop for OutlineItem {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut item) = pending.pop() {
            pending.append(&mut item.children);
        }
    }
}

/// Parses OPML text into the root-level outlines of its `<body>`.
///
/// The first element named exactly `body` (in document order) is the
/// anchor. Its `<outline>` children (tag matched case-insensitively) become
/// the returned items; every other node is skipped. Nesting depth is
/// unbounded: the tree is built with an explicit stack.
///
/// # Errors
///
/// Returns [`OpmlError::MalformedInput`] if the content is not well-formed
/// XML or has no `body` element.
pub fn parse_outlines(content: &str) -> Result<Vec<OutlineItem>, OpmlError> {
    let document = Document::parse(content)?;
    let body = document
        .find_first("body")
        .ok_or_else(|| OpmlError::malformed("No body element found"))?;
    Ok(collect_outlines(&document, body))
}

/// Builds the outline forest under `body` depth-first, in document order.
///
/// Each stack frame is an outline still collecting children, paired with
/// the child outline elements it has yet to visit.
fn collect_outlines(document: &Document, body: &Element) -> Vec<OutlineItem> {
    let mut roots = Vec::new();
    let mut remaining_roots = outline_children(document, body).into_iter();
    let mut stack: Vec<(OutlineItem, std::vec::IntoIter<&Element>)> = Vec::new();

    loop {
        let next = match stack.last_mut() {
            Some((_, remaining)) => remaining.next(),
            None => remaining_roots.next(),
        };

        match next {
            Some(element) => {
                let children = outline_children(document, element).into_iter();
                stack.push((outline_from_element(element), children));
            }
            None => {
                let Some((item, _)) = stack.pop() else {
                    break;
                };
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(item),
                    None => roots.push(item),
                }
            }
        }
    }

    roots
}

fn outline_children<'a>(document: &'a Document, parent: &'a Element) -> Vec<&'a Element> {
    document
        .child_elements(parent)
        .filter(|element| is_outline(element))
        .collect()
}

/// The outline's own fields; children are attached by [`collect_outlines`].
fn outline_from_element(element: &Element) -> OutlineItem {
    OutlineItem {
        text: present_attr(element, "text")
            .or_else(|| present_attr(element, "title"))
            .unwrap_or_default(),
        xml_url: present_attr(element, "xmlUrl"),
        html_url: present_attr(element, "htmlUrl"),
        description: present_attr(element, "description"),
        children: Vec::new(),
    }
}

fn is_outline(element: &Element) -> bool {
    element.tag.eq_ignore_ascii_case("outline")
}

/// An empty attribute value counts as absent.
fn present_attr(element: &Element, name: &str) -> Option<String> {
    element
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
