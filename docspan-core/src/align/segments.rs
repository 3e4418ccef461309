//! Flat-text rendering helper

use crate::align::merge::Span;
use serde::Serialize;

/// A run of the document, either plain or covered by span `span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment<'a> {
    Plain { text: &'a str },
    Highlight { text: &'a str, span: usize },
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain { text } | Segment::Highlight { text, .. } => text,
        }
    }
}

/// Split `document` along `spans`, which must be sorted and non-overlapping.
pub fn segments<'a>(document: &'a str, spans: &[Span]) -> Vec<Segment<'a>> {
    let mut out = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for (index, span) in spans.iter().enumerate() {
        let start = span.start.clamp(cursor, document.len());
        let end = span.end.clamp(start, document.len());
        if start > cursor {
            out.push(Segment::Plain {
                text: &document[cursor..start],
            });
        }
        if end > start {
            out.push(Segment::Highlight {
                text: &document[start..end],
                span: index,
            });
        }
        cursor = end;
    }
    if cursor < document.len() {
        out.push(Segment::Plain {
            text: &document[cursor..],
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::fragment::FragmentId;
    use crate::align::locate::Strategy;

    fn span(start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            owners: vec![FragmentId::from("1")],
            primary: FragmentId::from("1"),
            directive: None,
            role: None,
            diff: None,
            strategy: Strategy::Exact,
        }
    }

    #[test]
    fn segments_cover_the_whole_document() {
        let document = "aaa bbb ccc";
        let parts = segments(document, &[span(4, 7)]);
        assert_eq!(
            parts,
            vec![
                Segment::Plain { text: "aaa " },
                Segment::Highlight { text: "bbb", span: 0 },
                Segment::Plain { text: " ccc" },
            ]
        );
        let joined: String = parts.iter().map(Segment::text).collect();
        assert_eq!(joined, document);
    }

    #[test]
    fn spans_past_the_end_are_clipped() {
        let parts = segments("abc", &[span(1, 50)]);
        assert_eq!(parts.last(), Some(&Segment::Highlight { text: "bc", span: 0 }));
    }
}
