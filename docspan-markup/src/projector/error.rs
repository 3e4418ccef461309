//! Error types for markup projection

use docspan_core::AlignError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// The alignment itself failed
    Align(AlignError),
    /// A span resolved to an empty or inverted range of text nodes
    EmptyRange,
    /// An endpoint is not a text node
    NotText,
    /// In-place wrapping needs both endpoints under one parent
    DifferentParents,
    /// A node on the range was removed from the tree
    Detached,
    /// The common ancestor cannot hold a phrasing element
    UnwrappableContainer(String),
    /// The DOM could not be written back out
    Serialization(String),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::Align(err) => write!(f, "{}", err),
            ProjectionError::EmptyRange => write!(f, "Span covers no text"),
            ProjectionError::NotText => write!(f, "Span endpoint is not a text node"),
            ProjectionError::DifferentParents => {
                write!(f, "Span endpoints do not share a parent element")
            }
            ProjectionError::Detached => write!(f, "Span touches a node detached from the document"),
            ProjectionError::UnwrappableContainer(tag) => {
                write!(f, "Cannot insert a highlight directly inside <{}>", tag)
            }
            ProjectionError::Serialization(msg) => write!(f, "HTML serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for ProjectionError {}

impl From<AlignError> for ProjectionError {
    fn from(err: AlignError) -> Self {
        ProjectionError::Align(err)
    }
}
