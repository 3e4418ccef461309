//! Structured-markup projection
//!
//!     html ──parse──> DOM ──TextIndex──> concatenated text
//!                                          │ normalize (structured) + locate + merge
//!                                          ▼
//!     html <──serialize── DOM <──apply── spans (descending start)
//!
//!     Location uses the same strategies as flat text, except that the last resort is the
//!     fuzzy word run: rendered markup drops and reorders enough formatting that a fixed
//!     window after a normalized anchor is rarely right.

pub mod apply;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod text_index;
pub mod wrap;

pub use apply::{apply_plan, ApplicationReport, HighlightPlan};
pub use dom::MarkupDocument;
pub use error::ProjectionError;
pub use highlight::{highlight_element, HighlightOptions};
pub use text_index::{Boundary, TextIndex};
pub use wrap::{extract_and_wrap, wrap_in_place, WrapMethod};

use docspan_core::align::{
    locate_and_merge, AlignError, Aligner, Alignment, Fallback, Fragment, Locator, LocatorConfig,
    NormalizationCache, NormalizeMode,
};
use serde::Serialize;

/// [`Aligner`] for HTML documents. Span offsets refer to the concatenated text nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupAligner;

impl Aligner for MarkupAligner {
    fn align(
        &self,
        document: &str,
        fragments: &[Fragment],
        config: &LocatorConfig,
        cache: &mut NormalizationCache,
    ) -> Result<Alignment, AlignError> {
        let doc = MarkupDocument::parse(document);
        let index = TextIndex::build(&doc.document());
        align_index(&index, fragments, config, cache)
    }
}

/// Align `fragments` against the text view of an indexed document.
pub fn align_index(
    index: &TextIndex,
    fragments: &[Fragment],
    config: &LocatorConfig,
    cache: &mut NormalizationCache,
) -> Result<Alignment, AlignError> {
    if index.text().trim().is_empty() {
        return Err(AlignError::NoDocumentText);
    }
    let normalized = cache.get_or_normalize(index.text(), NormalizeMode::Structured);
    let locator =
        Locator::new(index.text(), normalized, config).with_fallback(Fallback::FuzzyWords);
    Ok(locate_and_merge(&locator, fragments))
}

/// Highlighted HTML together with the alignment behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub html: String,
    pub alignment: Alignment,
    pub report: ApplicationReport,
}

/// Aligns statements against HTML and writes the highlights into the markup.
#[derive(Debug, Clone, Default)]
pub struct MarkupProjector {
    options: HighlightOptions,
}

impl MarkupProjector {
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Align and highlight in one pass.
    pub fn project(
        &self,
        html: &str,
        fragments: &[Fragment],
        config: &LocatorConfig,
        cache: &mut NormalizationCache,
    ) -> Result<Projection, ProjectionError> {
        let doc = MarkupDocument::parse(html);
        let index = TextIndex::build(&doc.document());
        let alignment = align_index(&index, fragments, config, cache)?;
        let report = self.apply(&index, &alignment);
        let html = doc.to_html()?;
        Ok(Projection {
            html,
            alignment,
            report,
        })
    }

    /// Highlight an alignment computed earlier over the same `html`, e.g. by a session.
    pub fn render(
        &self,
        html: &str,
        alignment: &Alignment,
    ) -> Result<(String, ApplicationReport), ProjectionError> {
        let doc = MarkupDocument::parse(html);
        let index = TextIndex::build(&doc.document());
        let report = self.apply(&index, alignment);
        Ok((doc.to_html()?, report))
    }

    fn apply(&self, index: &TextIndex, alignment: &Alignment) -> ApplicationReport {
        let plan = HighlightPlan::new(index, &alignment.spans);
        let report = apply_plan(&plan, &alignment.spans, &self.options);
        tracing::info!(
            planned = plan.len(),
            applied = report.applied.len(),
            failed = report.failed.len(),
            "highlights applied"
        );
        report
    }
}
