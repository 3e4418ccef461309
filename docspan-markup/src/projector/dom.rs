//! DOM access over `markup5ever_rcdom`
//!
//! Parsing, serialization and the handful of tree edits the highlighter needs. Parent links in
//! `RcDom` are weak pointers stored in a `Cell`; every edit here keeps them in sync with the
//! child lists.

use crate::projector::error::ProjectionError;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope,
    Attribute, LocalName, ParseOpts, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A parsed HTML document or fragment.
pub struct MarkupDocument {
    dom: RcDom,
    full_document: bool,
}

impl MarkupDocument {
    /// Parse `html`. Input without a doctype or `<html>` root is treated as a body fragment
    /// and serialized back without the implied wrapper elements.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        let head = html.trim_start();
        let full_document =
            starts_with_ignore_case(head, "<!doctype") || starts_with_ignore_case(head, "<html");
        Self { dom, full_document }
    }

    /// The document node.
    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    /// `<body>`, when the parser produced one.
    pub fn body(&self) -> Option<Handle> {
        find_element(&self.dom.document, "body")
    }

    pub fn is_full_document(&self) -> bool {
        self.full_document
    }

    /// Serialize the (possibly edited) tree.
    pub fn to_html(&self) -> Result<String, ProjectionError> {
        let root = if self.full_document {
            self.document()
        } else {
            self.body().unwrap_or_else(|| self.document())
        };

        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        let mut output = Vec::new();
        let serializable = SerializableHandle::from(root);
        serialize(&mut output, &serializable, opts)
            .map_err(|e| ProjectionError::Serialization(e.to_string()))?;

        String::from_utf8(output)
            .map_err(|e| ProjectionError::Serialization(format!("UTF-8 conversion failed: {}", e)))
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// First element named `tag` in document order.
pub fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node) == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Empty copy of an element: same name and attributes, no children.
pub(crate) fn shallow_clone(node: &Handle) -> Option<Handle> {
    match &node.data {
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => Some(Rc::new(Node {
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            data: NodeData::Element {
                name: name.clone(),
                attrs: RefCell::new(attrs.borrow().clone()),
                template_contents: Default::default(),
                mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
            },
        })),
        _ => None,
    }
}

pub fn element_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_text(node: &Handle) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Concatenated text of `node` and its descendants.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take()?;
    let parent = weak.upgrade();
    node.parent.set(Some(weak));
    parent
}

pub(crate) fn index_in_parent(parent: &Handle, node: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))
}

pub(crate) fn insert_child(parent: &Handle, index: usize, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(index, child);
}

pub(crate) fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Move `parent`'s children in `range` to the end of `target`, keeping their order.
pub(crate) fn move_children(parent: &Handle, range: std::ops::Range<usize>, target: &Handle) {
    let moved: Vec<Handle> = parent.children.borrow_mut().drain(range).collect();
    for child in moved {
        append_child(target, child);
    }
}

/// Split a text node at byte `offset`. The node keeps the text before `offset`; the rest moves
/// into a new sibling inserted right after it, which is returned. Nothing happens at either
/// end of the text.
pub(crate) fn split_text(node: &Handle, offset: usize) -> Result<Option<Handle>, ProjectionError> {
    let NodeData::Text { contents } = &node.data else {
        return Err(ProjectionError::NotText);
    };
    let full = contents.borrow().to_string();
    if offset == 0 || offset >= full.len() {
        return Ok(None);
    }
    if !full.is_char_boundary(offset) {
        return Err(ProjectionError::EmptyRange);
    }
    let parent = parent_of(node).ok_or(ProjectionError::Detached)?;
    let index = index_in_parent(&parent, node).ok_or(ProjectionError::Detached)?;

    let tail = create_text(&full[offset..]);
    *contents.borrow_mut() = full[..offset].to_string().into();
    insert_child(&parent, index + 1, tail.clone());
    Ok(Some(tail))
}
