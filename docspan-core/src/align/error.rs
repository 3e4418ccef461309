//! Error types for the alignment pipeline

use std::fmt;

/// Errors surfaced by pipeline entry points.
///
/// Fragments that cannot be located are not errors; they are reported through
/// [`Alignment::unmatched`](crate::align::Alignment::unmatched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The document content is absent or only whitespace
    NoDocumentText,
    /// The statement list has not been delivered yet
    NoStatements,
    /// A delivery arrived for a view that was closed or replaced
    StaleView { ticket: u64, current: u64 },
    /// The document content could not be read in its declared representation
    InvalidDocument(String),
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::NoDocumentText => write!(f, "No document text"),
            AlignError::NoStatements => write!(f, "No statements available"),
            AlignError::StaleView { ticket, current } => write!(
                f,
                "Delivery for view generation {} rejected (current generation is {})",
                ticket, current
            ),
            AlignError::InvalidDocument(msg) => write!(f, "Invalid document: {}", msg),
        }
    }
}

impl std::error::Error for AlignError {}
