//! Statement navigation
//!
//! Maps the filtered statement order onto the span list so a navigation controller can move
//! to the next or previous statement and find the span to scroll to, regardless of how the
//! span is drawn.

use crate::align::fragment::{Fragment, FragmentId};
use crate::align::merge::Span;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationIndex {
    order: Vec<FragmentId>,
    position: HashMap<FragmentId, usize>,
    span_of: HashMap<FragmentId, usize>,
}

impl NavigationIndex {
    /// Index `fragments` (already filtered, in display order) against `spans`. Header
    /// fragments are not navigable.
    pub fn build(fragments: &[Fragment], spans: &[Span]) -> Self {
        let order: Vec<FragmentId> = fragments
            .iter()
            .filter(|f| !f.is_header)
            .map(|f| f.id.clone())
            .collect();
        let position = order
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();
        let mut span_of = HashMap::new();
        for (index, span) in spans.iter().enumerate() {
            for owner in &span.owners {
                span_of.entry(owner.clone()).or_insert(index);
            }
        }
        Self {
            order,
            position,
            span_of,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[FragmentId] {
        &self.order
    }

    pub fn position(&self, id: &FragmentId) -> Option<usize> {
        self.position.get(id).copied()
    }

    /// The statement after `current`; the first one when nothing is active. `None` at the
    /// end of the list.
    pub fn next(&self, current: Option<&FragmentId>) -> Option<&FragmentId> {
        match current.and_then(|id| self.position(id)) {
            Some(index) => self.order.get(index + 1),
            None => self.order.first(),
        }
    }

    /// The statement before `current`; the last one when nothing is active. `None` at the
    /// start of the list.
    pub fn previous(&self, current: Option<&FragmentId>) -> Option<&FragmentId> {
        match current.and_then(|id| self.position(id)) {
            Some(index) => index.checked_sub(1).and_then(|i| self.order.get(i)),
            None => self.order.last(),
        }
    }

    /// Index of the span to scroll to for `id`, if the statement was located.
    pub fn span_for(&self, id: &FragmentId) -> Option<usize> {
        self.span_of.get(id).copied()
    }
}
