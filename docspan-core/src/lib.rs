//! # docspan-core
//!
//! Locates extracted statements ("fragments") inside the document they were extracted from.
//!
//! File Layout
//!
//!     The engine lives under [`align`], one file per stage:
//!
//!     src/align
//!       ├── normalize      Collapses formatting noise, records a PositionMap
//!       ├── position_map   Normalized <-> original offset translation
//!       ├── locate         Ordered matching strategies for one fragment
//!       ├── words          Word tokenizer used by the fuzzy word-run strategy
//!       ├── merge          Sorts and folds overlapping matches into spans
//!       ├── diff           Two-scan classification into one ordered list
//!       ├── filter         Statement filter applied before locating
//!       ├── navigation     Next/previous statement lookup over the span list
//!       ├── segments       Flat-text rendering helper
//!       └── session        View lifecycle state (cache, filter, active statement)
//!
//!     Structured (HTML) documents are handled by the `docspan-markup` crate, which plugs into
//!     the same pipeline through the [`align::Aligner`] trait.
//!
//! All offsets are byte offsets into the original text and always fall on `char` boundaries.

pub mod align;

pub use align::{
    align_flat, Aligner, AlignError, Alignment, DiffStatus, FlatAligner, Fragment, FragmentId,
    LocatorConfig, NormalizationCache, NormalizeMode, ScanSource, Span,
};
