//! Wrapping a text range in a highlight element
//!
//!     Two operations, tried in this order by the applier:
//!
//!     wrap_in_place
//!         Both endpoints are text nodes with the same parent. The boundary text nodes are
//!         split and the siblings in between move into the highlight element. No element is
//!         duplicated.
//!
//!     extract_and_wrap
//!         The endpoints sit under different parents. Elements between each endpoint and the
//!         common ancestor that are only partly covered are split in two, so the covered part
//!         becomes a run of children of the common ancestor, which then moves into the
//!         highlight element. The common ancestor must accept phrasing content.
//!
//!     Both check every precondition before touching the tree; a failed call leaves the DOM
//!     unchanged.

use crate::projector::dom::{
    element_name, index_in_parent, insert_child, is_text, move_children, parent_of,
    shallow_clone, split_text, text_of,
};
use crate::projector::error::ProjectionError;
use crate::projector::text_index::Boundary;
use markup5ever_rcdom::{Handle, NodeData};
use serde::Serialize;
use std::rc::Rc;

/// Containers whose content model has no room for a `<mark>` child.
const NON_PHRASING_CONTAINERS: &[&str] = &[
    "table", "tbody", "thead", "tfoot", "tr", "ul", "ol", "dl", "select", "colgroup",
];

/// Which operation placed a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMethod {
    InPlace,
    Extracted,
}

/// Wrap the text between `start` and `end` in `mark`, which must be detached.
pub fn wrap_in_place(start: &Boundary, end: &Boundary, mark: &Handle) -> Result<(), ProjectionError> {
    check_text_endpoints(start, end)?;
    let parent = parent_of(&start.node).ok_or(ProjectionError::Detached)?;
    let end_parent = parent_of(&end.node).ok_or(ProjectionError::Detached)?;
    if !Rc::ptr_eq(&parent, &end_parent) {
        return Err(ProjectionError::DifferentParents);
    }
    let first = index_in_parent(&parent, &start.node).ok_or(ProjectionError::Detached)?;
    let last = index_in_parent(&parent, &end.node).ok_or(ProjectionError::Detached)?;
    if last < first {
        return Err(ProjectionError::EmptyRange);
    }

    let (first_node, last_node) = split_boundaries(start, end)?;
    surround(&parent, &first_node, &last_node, mark)
}

/// Wrap the text between `start` and `end` in `mark`, splitting partly covered ancestors.
pub fn extract_and_wrap(
    start: &Boundary,
    end: &Boundary,
    mark: &Handle,
) -> Result<(), ProjectionError> {
    check_text_endpoints(start, end)?;
    let start_chain = ancestors(&start.node)?;
    let end_chain = ancestors(&end.node)?;

    let common = end_chain
        .iter()
        .find(|node| start_chain.iter().any(|other| Rc::ptr_eq(other, node)))
        .cloned()
        .ok_or(ProjectionError::Detached)?;
    let common = if is_text(&common) {
        parent_of(&common).ok_or(ProjectionError::Detached)?
    } else {
        common
    };
    match element_name(&common) {
        Some(tag) if NON_PHRASING_CONTAINERS.contains(&tag) => {
            return Err(ProjectionError::UnwrappableContainer(tag.to_string()));
        }
        Some(_) => {}
        None => return Err(ProjectionError::UnwrappableContainer("#document".to_string())),
    }

    let (first_node, last_node) = split_boundaries(start, end)?;
    let first_top = lift(&first_node, &common, Side::Start)?;
    let last_top = lift(&last_node, &common, Side::End)?;
    surround(&common, &first_top, &last_top, mark)
}

fn check_text_endpoints(start: &Boundary, end: &Boundary) -> Result<(), ProjectionError> {
    if !is_text(&start.node) || !is_text(&end.node) {
        return Err(ProjectionError::NotText);
    }
    let start_len = text_of(&start.node).map_or(0, |text| text.len());
    if start.offset >= start_len || end.offset == 0 {
        return Err(ProjectionError::EmptyRange);
    }
    if Rc::ptr_eq(&start.node, &end.node) && end.offset <= start.offset {
        return Err(ProjectionError::EmptyRange);
    }
    Ok(())
}

/// `node` and its ancestors up to the document node.
fn ancestors(node: &Handle) -> Result<Vec<Handle>, ProjectionError> {
    let mut chain = vec![node.clone()];
    while let Some(parent) = chain.last().and_then(parent_of) {
        chain.push(parent);
    }
    match chain.last().map(|root| &root.data) {
        Some(NodeData::Document) => Ok(chain),
        _ => Err(ProjectionError::Detached),
    }
}

/// Split the endpoint text nodes so the covered text is exactly the nodes from the first to
/// the last returned one.
fn split_boundaries(start: &Boundary, end: &Boundary) -> Result<(Handle, Handle), ProjectionError> {
    let same_node = Rc::ptr_eq(&start.node, &end.node);
    let first = split_text(&start.node, start.offset)?.unwrap_or_else(|| start.node.clone());

    let (last, end_offset) = if same_node {
        (first.clone(), end.offset - start.offset)
    } else {
        (end.node.clone(), end.offset)
    };
    split_text(&last, end_offset)?;
    Ok((first, last))
}

#[derive(Clone, Copy)]
enum Side {
    Start,
    End,
}

/// Split every ancestor of `node` below `common` so that, on `side`, nothing uncovered
/// remains inside it. Returns the child of `common` that now holds `node`.
fn lift(node: &Handle, common: &Handle, side: Side) -> Result<Handle, ProjectionError> {
    let mut current = node.clone();
    loop {
        let parent = parent_of(&current).ok_or(ProjectionError::Detached)?;
        if Rc::ptr_eq(&parent, common) {
            return Ok(current);
        }
        let index = index_in_parent(&parent, &current).ok_or(ProjectionError::Detached)?;
        let len = parent.children.borrow().len();
        let uncovered = match side {
            Side::Start => 0..index,
            Side::End => index + 1..len,
        };
        if !uncovered.is_empty() {
            let grandparent = parent_of(&parent).ok_or(ProjectionError::Detached)?;
            let at = index_in_parent(&grandparent, &parent).ok_or(ProjectionError::Detached)?;
            let piece = shallow_clone(&parent).ok_or(ProjectionError::Detached)?;
            move_children(&parent, uncovered, &piece);
            let position = match side {
                Side::Start => at,
                Side::End => at + 1,
            };
            insert_child(&grandparent, position, piece);
        }
        current = parent;
    }
}

/// Move the children of `container` from `first` to `last` into `mark`, and put `mark` where
/// they were.
fn surround(
    container: &Handle,
    first: &Handle,
    last: &Handle,
    mark: &Handle,
) -> Result<(), ProjectionError> {
    let from = index_in_parent(container, first).ok_or(ProjectionError::Detached)?;
    let to = index_in_parent(container, last).ok_or(ProjectionError::Detached)?;
    if to < from {
        return Err(ProjectionError::EmptyRange);
    }
    move_children(container, from..to + 1, mark);
    insert_child(container, from, mark.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::dom::{create_element, MarkupDocument};
    use crate::projector::text_index::TextIndex;

    fn range(doc: &MarkupDocument, start: usize, end: usize) -> (Boundary, Boundary) {
        let index = TextIndex::build(&doc.document());
        (
            index.resolve_start(start).unwrap(),
            index.resolve_end(end).unwrap(),
        )
    }

    #[test]
    fn in_place_wraps_within_one_text_node() {
        let doc = MarkupDocument::parse("<p>Hello world</p>");
        let (start, end) = range(&doc, 6, 11);
        wrap_in_place(&start, &end, &create_element("mark", vec![])).unwrap();
        assert_eq!(doc.to_html().unwrap(), "<p>Hello <mark>world</mark></p>");
    }

    #[test]
    fn in_place_wraps_sibling_nodes() {
        let doc = MarkupDocument::parse("<p>Hello <b>world</b>. Bye</p>");
        let (start, end) = range(&doc, 0, 12);
        wrap_in_place(&start, &end, &create_element("mark", vec![])).unwrap();
        assert_eq!(
            doc.to_html().unwrap(),
            "<p><mark>Hello <b>world</b>.</mark> Bye</p>"
        );
    }

    #[test]
    fn in_place_refuses_different_parents_and_leaves_tree_alone() {
        let doc = MarkupDocument::parse("<p>Hello <b>world</b>. Bye</p>");
        let (start, end) = range(&doc, 6, 12);
        let err = wrap_in_place(&start, &end, &create_element("mark", vec![])).unwrap_err();
        assert_eq!(err, ProjectionError::DifferentParents);
        assert_eq!(doc.to_html().unwrap(), "<p>Hello <b>world</b>. Bye</p>");
    }

    #[test]
    fn extract_splits_partly_covered_elements() {
        let doc = MarkupDocument::parse("<p>Hello <b>world</b>. Bye</p>");
        let (start, end) = range(&doc, 8, 14);
        extract_and_wrap(&start, &end, &create_element("mark", vec![])).unwrap();
        assert_eq!(
            doc.to_html().unwrap(),
            "<p>Hello <b>wo</b><mark><b>rld</b>. B</mark>ye</p>"
        );
    }

    #[test]
    fn extract_refuses_table_rows() {
        let doc = MarkupDocument::parse(
            "<table><tbody><tr><td>alpha</td><td>beta</td></tr></tbody></table>",
        );
        let (start, end) = range(&doc, 2, 7);
        let err = extract_and_wrap(&start, &end, &create_element("mark", vec![])).unwrap_err();
        assert_eq!(err, ProjectionError::UnwrappableContainer("tr".to_string()));
    }
}
