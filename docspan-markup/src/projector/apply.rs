//! Highlight application
//!
//!     Spans are resolved to tree positions up front, then applied from the last span to the
//!     first. Splitting a text node keeps its head in the original node, so positions that
//!     lie before the current span stay valid no matter how the tree after them changed.

use crate::projector::error::ProjectionError;
use crate::projector::highlight::{highlight_element, HighlightOptions};
use crate::projector::text_index::{Boundary, TextIndex};
use crate::projector::wrap::{extract_and_wrap, wrap_in_place, WrapMethod};
use docspan_core::align::{FragmentId, Span};
use serde::Serialize;

/// One span resolved to tree positions.
#[derive(Debug, Clone)]
pub struct PlannedHighlight {
    /// Index into the span list the plan was built from
    pub span: usize,
    pub offset: usize,
    pub start: Boundary,
    pub end: Boundary,
}

/// Spans resolved against a [`TextIndex`], in application order.
#[derive(Debug, Clone, Default)]
pub struct HighlightPlan {
    items: Vec<PlannedHighlight>,
}

impl HighlightPlan {
    pub fn new(index: &TextIndex, spans: &[Span]) -> Self {
        let mut items: Vec<PlannedHighlight> = spans
            .iter()
            .enumerate()
            .filter_map(|(i, span)| {
                Some(PlannedHighlight {
                    span: i,
                    offset: span.start,
                    start: index.resolve_start(span.start)?,
                    end: index.resolve_end(span.end)?,
                })
            })
            .collect();
        items.sort_by(|a, b| b.offset.cmp(&a.offset));
        Self { items }
    }

    pub fn items(&self) -> &[PlannedHighlight] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedHighlight {
    pub span: usize,
    pub method: WrapMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedHighlight {
    pub span: usize,
    pub primary: FragmentId,
    #[serde(serialize_with = "serialize_error")]
    pub error: ProjectionError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ProjectionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// What happened to each planned highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationReport {
    pub applied: Vec<AppliedHighlight>,
    pub failed: Vec<FailedHighlight>,
}

impl ApplicationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Apply `plan` to its tree. A span that neither operation can wrap is skipped and reported;
/// the others are still applied.
pub fn apply_plan(plan: &HighlightPlan, spans: &[Span], options: &HighlightOptions) -> ApplicationReport {
    let mut report = ApplicationReport::default();

    for item in plan.items() {
        let Some(span) = spans.get(item.span) else {
            continue;
        };
        let mark = highlight_element(span, options);
        let outcome = wrap_in_place(&item.start, &item.end, &mark)
            .map(|()| WrapMethod::InPlace)
            .or_else(|_| extract_and_wrap(&item.start, &item.end, &mark).map(|()| WrapMethod::Extracted));

        match outcome {
            Ok(method) => report.applied.push(AppliedHighlight {
                span: item.span,
                method,
            }),
            Err(error) => {
                tracing::warn!(
                    span = item.span,
                    primary = %span.primary,
                    %error,
                    "highlight skipped"
                );
                report.failed.push(FailedHighlight {
                    span: item.span,
                    primary: span.primary.clone(),
                    error,
                });
            }
        }
    }

    report
}
