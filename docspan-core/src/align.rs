//! Fragment-to-source alignment
//!
//!     A run of the pipeline takes one document and an ordered statement list and produces an
//!     [`Alignment`]: the merged span list plus the ids that could not be placed.
//!
//!     document ──normalize──> Normalized ─┐
//!     fragments ─────────────────────────┴─locate─> matches ─merge─> spans
//!
//!     The normalization of the document is the only expensive input that survives between
//!     runs; it is held by a caller-owned [`NormalizationCache`]. Structured documents go
//!     through the same steps behind the [`Aligner`] trait, with their own text view and
//!     fallback strategy.

pub mod diff;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod locate;
pub mod merge;
pub mod navigation;
pub mod normalize;
pub mod position_map;
pub mod segments;
pub mod session;
pub mod words;

pub use diff::{
    classified_fragments, classify, DiffEntry, DiffStatus, DiffTag, ModifiedPair, ScanDiff,
    ScanMetadata, ScanPair, ScanSource, WordChange, WordChangeKind,
};
pub use error::AlignError;
pub use filter::StatementFilter;
pub use fragment::{Fragment, FragmentId};
pub use locate::{Fallback, Located, Locator, LocatorConfig, Outcome, SkipReason, Strategy};
pub use merge::{merge_matches, Match, Span};
pub use navigation::NavigationIndex;
pub use normalize::{normalize, NormalizationCache, NormalizeMode, Normalized};
pub use position_map::PositionMap;
pub use segments::{segments, Segment};
pub use session::{ReviewSession, ViewTicket};

use serde::Serialize;

/// Document content with its representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Plain text, aligned directly
    Flat(String),
    /// HTML, aligned through its text nodes
    Markup(String),
}

impl DocumentContent {
    pub fn raw(&self) -> &str {
        match self {
            DocumentContent::Flat(text) | DocumentContent::Markup(text) => text,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, DocumentContent::Markup(_))
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Alignment {
    /// Sorted, non-overlapping spans
    pub spans: Vec<Span>,
    /// Fragments that no strategy could place, in input order
    pub unmatched: Vec<FragmentId>,
    /// Fragments that were not searched for
    pub skipped: Vec<(FragmentId, SkipReason)>,
}

impl Alignment {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Index of the first span owned by `id`.
    pub fn span_index_of(&self, id: &FragmentId) -> Option<usize> {
        self.spans.iter().position(|span| span.is_owned_by(id))
    }

    pub fn span_of(&self, id: &FragmentId) -> Option<&Span> {
        self.span_index_of(id).map(|index| &self.spans[index])
    }

    pub fn located_count(&self) -> usize {
        self.spans.iter().map(|span| span.owners.len()).sum()
    }
}

/// Locate every fragment with `locator` and merge the hits.
pub fn locate_and_merge(locator: &Locator<'_>, fragments: &[Fragment]) -> Alignment {
    let mut matches = Vec::with_capacity(fragments.len());
    let mut unmatched = Vec::new();
    let mut skipped = Vec::new();

    for fragment in fragments {
        match locator.locate(fragment) {
            Outcome::Located(located) => matches.push(Match { fragment, located }),
            Outcome::Unmatched => unmatched.push(fragment.id.clone()),
            Outcome::Skipped(reason) => skipped.push((fragment.id.clone(), reason)),
        }
    }

    let spans = merge_matches(matches);
    tracing::info!(
        fragments = fragments.len(),
        spans = spans.len(),
        unmatched = unmatched.len(),
        skipped = skipped.len(),
        "alignment finished"
    );

    Alignment {
        spans,
        unmatched,
        skipped,
    }
}

/// Align `fragments` against a flat text document.
pub fn align_flat(
    document: &str,
    fragments: &[Fragment],
    config: &LocatorConfig,
    cache: &mut NormalizationCache,
) -> Result<Alignment, AlignError> {
    if document.trim().is_empty() {
        return Err(AlignError::NoDocumentText);
    }
    let normalized = cache.get_or_normalize(document, NormalizeMode::Plain);
    let locator = Locator::new(document, normalized, config);
    Ok(locate_and_merge(&locator, fragments))
}

/// A pipeline over one document representation.
///
/// Span offsets in the returned [`Alignment`] refer to the text view of the implementation:
/// the document itself for flat text, the concatenated text nodes for markup.
pub trait Aligner {
    fn align(
        &self,
        document: &str,
        fragments: &[Fragment],
        config: &LocatorConfig,
        cache: &mut NormalizationCache,
    ) -> Result<Alignment, AlignError>;
}

/// [`Aligner`] for plain text documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatAligner;

impl Aligner for FlatAligner {
    fn align(
        &self,
        document: &str,
        fragments: &[Fragment],
        config: &LocatorConfig,
        cache: &mut NormalizationCache,
    ) -> Result<Alignment, AlignError> {
        align_flat(document, fragments, config, cache)
    }
}
