//! Linear text view of a DOM
//!
//!     The locator works on one string. For markup that string is the concatenation of every
//!     rendered text node in document order, and the index remembers which node contributed
//!     which byte range so a span found in the string can be turned back into tree positions.
//!
//!     Entries are contiguous: each one starts where the previous one ends, and together they
//!     cover the whole string. Empty text nodes are left out.

use crate::projector::dom::element_name;
use markup5ever_rcdom::{Handle, NodeData};
use std::rc::Rc;

/// Elements whose text is never rendered.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "head", "noscript"];

/// One text node's slice of the concatenated text.
#[derive(Clone)]
pub struct TextEntry {
    pub node: Handle,
    pub start: usize,
    pub len: usize,
}

impl TextEntry {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

impl std::fmt::Debug for TextEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEntry")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// A position inside a text node, in bytes.
#[derive(Clone)]
pub struct Boundary {
    pub node: Handle,
    pub offset: usize,
}

impl PartialEq for Boundary {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node) && self.offset == other.offset
    }
}

impl std::fmt::Debug for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boundary")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    text: String,
    entries: Vec<TextEntry>,
}

impl TextIndex {
    /// Index every rendered text node below `root`.
    pub fn build(root: &Handle) -> Self {
        let mut index = Self::default();
        index.visit(root);
        index
    }

    fn visit(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => {
                let contents = contents.borrow();
                if !contents.is_empty() {
                    self.entries.push(TextEntry {
                        node: node.clone(),
                        start: self.text.len(),
                        len: contents.len(),
                    });
                    self.text.push_str(&contents);
                }
            }
            NodeData::Element { .. } => {
                if element_name(node).is_some_and(|tag| SKIPPED_ELEMENTS.contains(&tag)) {
                    return;
                }
                for child in node.children.borrow().iter() {
                    self.visit(child);
                }
            }
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.visit(child);
                }
            }
            _ => {}
        }
    }

    /// The concatenated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[TextEntry] {
        &self.entries
    }

    /// Tree position of a span start. An offset on a node boundary belongs to the node that
    /// begins there.
    pub fn resolve_start(&self, offset: usize) -> Option<Boundary> {
        self.entries
            .iter()
            .find(|entry| offset >= entry.start && offset < entry.end())
            .map(|entry| boundary(entry, offset))
            .or_else(|| self.clamped())
    }

    /// Tree position of a span end. An offset on a node boundary belongs to the node that
    /// ends there.
    pub fn resolve_end(&self, offset: usize) -> Option<Boundary> {
        self.entries
            .iter()
            .find(|entry| offset > entry.start && offset <= entry.end())
            .map(|entry| boundary(entry, offset))
            .or_else(|| self.clamped())
    }

    /// Out-of-range offsets land at the end of the last node.
    fn clamped(&self) -> Option<Boundary> {
        self.entries.last().map(|entry| Boundary {
            node: entry.node.clone(),
            offset: entry.len,
        })
    }
}

fn boundary(entry: &TextEntry, offset: usize) -> Boundary {
    Boundary {
        node: entry.node.clone(),
        offset: offset - entry.start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::dom::{text_of, MarkupDocument};

    #[test]
    fn entries_cover_the_rendered_text() {
        let doc = MarkupDocument::parse(
            "<style>p { color: red }</style><p>Hello <b>world</b>. Bye</p><script>x()</script>",
        );
        let index = TextIndex::build(&doc.document());

        assert_eq!(index.text(), "Hello world. Bye");
        let spans: Vec<(usize, usize)> = index.entries().iter().map(|e| (e.start, e.len)).collect();
        assert_eq!(spans, vec![(0, 6), (6, 5), (11, 5)]);
    }

    #[test]
    fn span_endpoints_resolve_to_node_offsets() {
        let doc = MarkupDocument::parse("<p>Hello <b>world</b>. Bye</p>");
        let index = TextIndex::build(&doc.document());
        let nodes: Vec<Handle> = index.entries().iter().map(|e| e.node.clone()).collect();

        let start = index.resolve_start(6).unwrap();
        let end = index.resolve_end(12).unwrap();
        assert!(Rc::ptr_eq(&start.node, &nodes[1]));
        assert_eq!(start.offset, 0);
        assert!(Rc::ptr_eq(&end.node, &nodes[2]));
        assert_eq!(end.offset, 1);

        let end = index.resolve_end(11).unwrap();
        assert_eq!(text_of(&end.node).as_deref(), Some("world"));
        assert_eq!(end.offset, 5);
    }

    #[test]
    fn out_of_range_offsets_clamp_to_the_last_node() {
        let doc = MarkupDocument::parse("<p>abc</p><p>def</p>");
        let index = TextIndex::build(&doc.document());
        let end = index.resolve_end(99).unwrap();
        assert_eq!(text_of(&end.node).as_deref(), Some("def"));
        assert_eq!(end.offset, 3);
    }
}
