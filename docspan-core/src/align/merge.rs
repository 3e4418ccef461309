//! Span merging
//!
//!     Located fragments are sorted by start and folded into a non-overlapping list. A match
//!     that starts before the end of the open span joins that span as an additional owner;
//!     the span keeps its boundaries. Matches with equal starts keep their input order.
//!
//!     When several fragments share a span, the owner with the longest description is the
//!     primary one (first in input order on ties). Directive, role and diff tag of the span
//!     come from the primary owner.

use crate::align::diff::DiffTag;
use crate::align::fragment::{Fragment, FragmentId};
use crate::align::locate::{Located, Strategy};
use serde::Serialize;

/// A highlighted range of the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Every fragment folded into this span, in match order
    pub owners: Vec<FragmentId>,
    pub primary: FragmentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffTag>,
    /// Strategy that located the fragment opening this span
    pub strategy: Strategy,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn is_owned_by(&self, id: &FragmentId) -> bool {
        self.owners.contains(id)
    }
}

/// A located fragment waiting to be merged.
#[derive(Debug, Clone, Copy)]
pub struct Match<'f> {
    pub fragment: &'f Fragment,
    pub located: Located,
}

struct OpenSpan<'f> {
    start: usize,
    end: usize,
    strategy: Strategy,
    owners: Vec<&'f Fragment>,
}

impl<'f> OpenSpan<'f> {
    fn close(self) -> Span {
        let primary = primary_owner(&self.owners);
        Span {
            start: self.start,
            end: self.end,
            owners: self.owners.iter().map(|f| f.id.clone()).collect(),
            primary: primary.id.clone(),
            directive: primary.directive.clone(),
            role: primary.role.clone(),
            diff: primary.diff,
            strategy: self.strategy,
        }
    }
}

fn primary_owner<'f>(owners: &[&'f Fragment]) -> &'f Fragment {
    let mut primary = owners[0];
    for &owner in &owners[1..] {
        if owner.text_chars() > primary.text_chars() {
            primary = owner;
        }
    }
    primary
}

/// Sort and fold matches into an ascending, non-overlapping span list.
pub fn merge_matches(mut matches: Vec<Match<'_>>) -> Vec<Span> {
    matches.sort_by_key(|m| m.located.start);

    let mut open: Vec<OpenSpan<'_>> = Vec::with_capacity(matches.len());
    for m in matches {
        match open.last_mut() {
            Some(current) if m.located.start < current.end => current.owners.push(m.fragment),
            _ => open.push(OpenSpan {
                start: m.located.start,
                end: m.located.end,
                strategy: m.located.strategy,
                owners: vec![m.fragment],
            }),
        }
    }

    open.into_iter().map(OpenSpan::close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(fragment: &Fragment, start: usize, end: usize) -> Match<'_> {
        Match {
            fragment,
            located: Located {
                start,
                end,
                strategy: Strategy::Exact,
            },
        }
    }

    #[test]
    fn disjoint_matches_stay_separate_and_sorted() {
        let a = Fragment::new("a", "first");
        let b = Fragment::new("b", "second");
        let spans = merge_matches(vec![at(&b, 20, 30), at(&a, 0, 10)]);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[1].start), (0, 20));
        assert_eq!(spans[0].owners, vec![FragmentId::from("a")]);
    }

    #[test]
    fn overlap_folds_owner_without_extending() {
        let a = Fragment::new("a", "first");
        let b = Fragment::new("b", "second");
        let spans = merge_matches(vec![at(&a, 0, 10), at(&b, 5, 40)]);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 10));
        assert_eq!(spans[0].owners, vec![FragmentId::from("a"), FragmentId::from("b")]);
    }

    #[test]
    fn touching_spans_do_not_merge() {
        let a = Fragment::new("a", "first");
        let b = Fragment::new("b", "second");
        let spans = merge_matches(vec![at(&a, 0, 10), at(&b, 10, 20)]);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn longest_description_is_primary() {
        let short = Fragment::new("s", "short one").with_role("buyer");
        let long = Fragment::new("l", "the longer description").with_role("vendor");
        let spans = merge_matches(vec![at(&short, 0, 40), at(&long, 0, 40)]);
        assert_eq!(spans[0].primary, FragmentId::from("l"));
        assert_eq!(spans[0].role.as_deref(), Some("vendor"));
        assert_eq!(spans[0].owners[0], FragmentId::from("s"));
    }

    #[test]
    fn equal_lengths_keep_first_owner_as_primary() {
        let a = Fragment::new("a", "same len");
        let b = Fragment::new("b", "same len");
        let spans = merge_matches(vec![at(&a, 3, 9), at(&b, 3, 9)]);
        assert_eq!(spans[0].primary, FragmentId::from("a"));
    }
}
