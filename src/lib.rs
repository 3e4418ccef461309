//! # docspan
//!
//! Locates extracted statements inside their source document and highlights them.
//!
//! The workspace is split by representation:
//!
//! - [`align`]: normalization, the locator cascade, span merging, the two-scan diff and the
//!   review session. Works on plain text.
//! - [`markup`]: the HTML text view and the highlight projector.
//! - [`config`]: layered configuration with built-in defaults.
//!
//! Most callers only need [`align_document`].

pub use docspan_config as config;
pub use docspan_core::align;
pub use docspan_markup as markup;

use docspan_core::align::{
    Aligner, AlignError, Alignment, DocumentContent, FlatAligner, Fragment, LocatorConfig,
    NormalizationCache,
};
use docspan_markup::MarkupAligner;

/// Align `fragments` against either representation with a fresh cache.
///
/// Callers that align the same document repeatedly should hold a
/// [`NormalizationCache`] and use the [`Aligner`] implementations directly.
pub fn align_document(
    content: &DocumentContent,
    fragments: &[Fragment],
    config: &LocatorConfig,
) -> Result<Alignment, AlignError> {
    let mut cache = NormalizationCache::new();
    match content {
        DocumentContent::Flat(text) => FlatAligner.align(text, fragments, config, &mut cache),
        DocumentContent::Markup(html) => MarkupAligner.align(html, fragments, config, &mut cache),
    }
}
