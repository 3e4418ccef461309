//! Highlight element construction

use crate::projector::dom::{append_child, create_element, create_text};
use docspan_core::align::{FragmentId, Span};
use markup5ever_rcdom::Handle;
use serde::Deserialize;

/// How highlight elements are named and decorated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Prefix of every class the highlighter emits
    pub class_prefix: String,
    /// Insert an inline status label into diff-tagged highlights
    pub diff_labels: bool,
    /// Statement rendered with the active class
    #[serde(skip)]
    pub active: Option<FragmentId>,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            class_prefix: "docspan".to_string(),
            diff_labels: true,
            active: None,
        }
    }
}

impl HighlightOptions {
    fn class(&self, suffix: &str) -> String {
        format!("{}-{}", self.class_prefix, suffix)
    }

    /// Class list for `span`.
    pub fn classes(&self, span: &Span) -> String {
        let mut classes = vec![self.class("highlight")];
        if let Some(directive) = &span.directive {
            classes.push(self.class(&format!("directive-{}", class_token(directive))));
        }
        if let Some(tag) = span.diff {
            classes.push(self.class(tag.status.as_str()));
            if tag.status.suppresses_styling() {
                classes.push(self.class("muted"));
            }
        }
        if self
            .active
            .as_ref()
            .is_some_and(|active| span.is_owned_by(active))
        {
            classes.push(self.class("active"));
        }
        classes.join(" ")
    }
}

/// Lowercase, with anything but ASCII alphanumerics turned into `-`.
fn class_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Build the empty `<mark>` element for `span`, with its status label if enabled.
pub fn highlight_element(span: &Span, options: &HighlightOptions) -> Handle {
    let classes = options.classes(span);
    let ids = span
        .owners
        .iter()
        .map(FragmentId::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    let mut attrs = vec![
        ("class", classes.as_str()),
        ("data-statement-ids", ids.as_str()),
        ("data-primary-id", span.primary.as_str()),
    ];
    if let Some(directive) = &span.directive {
        attrs.push(("data-directive", directive.as_str()));
    }
    if let Some(role) = &span.role {
        attrs.push(("data-role", role.as_str()));
    }
    if let Some(tag) = span.diff {
        attrs.push(("data-diff-status", tag.status.as_str()));
        attrs.push(("data-diff-source", tag.source.as_str()));
    }
    let mark = create_element("mark", attrs);

    if options.diff_labels {
        if let Some(label) = span.diff.and_then(|tag| tag.status.label()) {
            let label_class = options.class("diff-label");
            let badge = create_element("span", vec![("class", label_class.as_str())]);
            append_child(&badge, create_text(label));
            append_child(&mark, badge);
        }
    }
    mark
}
