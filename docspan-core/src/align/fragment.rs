//! Statement fragments as delivered by the statement provider

use crate::align::diff::DiffTag;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identity of a statement.
///
/// Providers send ids either as strings or as integers; both forms deserialize into the
/// same textual id so that lookups never depend on the wire type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for FragmentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for FragmentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => FragmentId(text),
            RawId::Integer(value) => FragmentId(value.to_string()),
        })
    }
}

/// One extracted statement: the unit the engine locates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: FragmentId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "directiveKeyword",
        skip_serializing_if = "Option::is_none"
    )]
    pub directive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub is_header: bool,
    /// Assigned by the diff classifier; absent outside diff mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffTag>,
}

impl Fragment {
    pub fn new(id: impl Into<FragmentId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: Some(description.into()),
            directive: None,
            role: None,
            is_header: false,
            diff: None,
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn as_header(mut self) -> Self {
        self.is_header = true;
        self
    }

    pub fn with_diff(mut self, diff: DiffTag) -> Self {
        self.diff = Some(diff);
        self
    }

    /// The description text, or `""` when the provider sent none.
    pub fn text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Description length in characters, used to pick the primary owner of a merged span.
    pub fn text_chars(&self) -> usize {
        self.text().chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_strings_and_integers() {
        let fragments: Vec<Fragment> = serde_json::from_str(
            r#"[{"id": 7, "description": "a"}, {"id": "s-8", "description": "b"}]"#,
        )
        .unwrap();
        assert_eq!(fragments[0].id, FragmentId::from("7"));
        assert_eq!(fragments[1].id.as_str(), "s-8");
    }

    #[test]
    fn provider_field_names_are_understood() {
        let fragment: Fragment = serde_json::from_str(
            r#"{"id": 1, "description": null, "directiveKeyword": "shall", "isHeader": true}"#,
        )
        .unwrap();
        assert_eq!(fragment.text(), "");
        assert_eq!(fragment.directive.as_deref(), Some("shall"));
        assert!(fragment.is_header);
    }

    #[test]
    fn text_chars_counts_characters_not_bytes() {
        let fragment = Fragment::new("1", "déjà vu");
        assert_eq!(fragment.text_chars(), 7);
    }
}
