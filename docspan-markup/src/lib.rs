//! # docspan-markup
//!
//! Projects statement spans onto HTML documents: builds a linear text view over the DOM's
//! text nodes, aligns statements against it with `docspan-core`, and wraps each span in a
//! `<mark>` element carrying the statement metadata.
//!
//! File Layout
//!
//!     src/projector
//!       ├── dom          Parse, serialize and edit the `markup5ever_rcdom` tree
//!       ├── text_index   Text nodes <-> offsets in the concatenated text
//!       ├── highlight    The `<mark>` element and its classes
//!       ├── wrap         wrap_in_place / extract_and_wrap
//!       └── apply        Descending-order application with per-span failure reports

pub mod projector;

pub use projector::{
    align_index, ApplicationReport, HighlightOptions, MarkupAligner, MarkupDocument,
    MarkupProjector, Projection, ProjectionError, TextIndex, WrapMethod,
};
