//! Output rendering for the `locate` and `diff` commands

use crate::error::CliError;
use docspan_config::OutputFormat;
use docspan_core::align::{segments, Alignment, DiffEntry, DocumentContent, WordChange};
use docspan_markup::MarkupProjector;
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    representation: &'static str,
    #[serde(flatten)]
    alignment: &'a Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<EntryView<'a>>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    entry: &'a DiffEntry,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    word_changes: Vec<WordChange>,
}

pub struct Renderer<'a> {
    pub format: OutputFormat,
    pub pretty: bool,
    pub projector: &'a MarkupProjector,
}

impl Renderer<'_> {
    pub fn render(
        &self,
        content: &DocumentContent,
        alignment: &Alignment,
        entries: Option<&[DiffEntry]>,
    ) -> Result<String, CliError> {
        match (self.format, content) {
            (OutputFormat::Json, _) => {
                let report = Report {
                    representation: if content.is_markup() { "markup" } else { "flat" },
                    alignment,
                    entries: entries.map(|entries| {
                        entries
                            .iter()
                            .map(|entry| EntryView {
                                entry,
                                word_changes: entry.word_changes(),
                            })
                            .collect()
                    }),
                };
                self.json(&report)
            }
            (OutputFormat::Segments, DocumentContent::Flat(text)) => {
                self.json(&segments(text, &alignment.spans))
            }
            (OutputFormat::Html, DocumentContent::Markup(html)) => {
                // Spans that could not be wrapped are logged by the projector.
                let (out, _report) = self.projector.render(html, alignment)?;
                Ok(out)
            }
            (format, content) => Err(CliError::Usage(format!(
                "Format '{}' is not available for {} documents",
                format.as_str(),
                if content.is_markup() { "markup" } else { "flat" }
            ))),
        }
    }

    fn json<T: Serialize>(&self, value: &T) -> Result<String, CliError> {
        let mut out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        out.push('\n');
        Ok(out)
    }
}
