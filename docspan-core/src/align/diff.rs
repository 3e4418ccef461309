//! Two-scan diff classification
//!
//!     A review can compare two scans of the same document. Rather than rendering two
//!     documents, the classifier produces one ordered statement list where every entry is
//!     tagged with its [`DiffStatus`] and the scan it came from. That list is fed through
//!     the normal locate/merge pipeline, so one highlighted view shows additions, removals
//!     and modifications together.
//!
//!     Ordering: entries of the newer scan keep their order. Each removed statement is
//!     spliced in before the first entry whose ordinal is at least its own ordinal in the
//!     older scan, or appended when no such entry exists.

use crate::align::fragment::{Fragment, FragmentId};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashMap, HashSet};

/// Classification of a statement relative to a pair of scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    ModifiedNew,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffStatus::Added => "added",
            DiffStatus::Removed => "removed",
            DiffStatus::ModifiedNew => "modified_new",
            DiffStatus::Unchanged => "unchanged",
        }
    }

    /// Inline label shown next to the highlight. Unchanged statements carry none.
    pub fn label(self) -> Option<&'static str> {
        match self {
            DiffStatus::Added => Some("Added"),
            DiffStatus::Removed => Some("Removed"),
            DiffStatus::ModifiedNew => Some("Modified"),
            DiffStatus::Unchanged => None,
        }
    }

    /// Removed statements are rendered without the normal highlight styling.
    pub fn suppresses_styling(self) -> bool {
        self == DiffStatus::Removed
    }
}

/// Which scan an entry originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    Newer,
    Older,
}

impl ScanSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanSource::Newer => "newer",
            ScanSource::Older => "older",
        }
    }
}

/// Status plus origin, attached to fragments in diff mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffTag {
    pub status: DiffStatus,
    pub source: ScanSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedPair {
    pub new: Fragment,
    pub old: Fragment,
}

/// A precomputed diff between two scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDiff {
    #[serde(default)]
    pub added: Vec<Fragment>,
    #[serde(default)]
    pub removed: Vec<Fragment>,
    #[serde(default)]
    pub modified: Vec<ModifiedPair>,
    /// Statements of the older scan (scan 1), in document order
    #[serde(default, rename = "statementsScan1", alias = "older")]
    pub older: Vec<Fragment>,
    /// Statements of the newer scan (scan 2), in document order
    #[serde(default, rename = "statementsScan2", alias = "newer")]
    pub newer: Vec<Fragment>,
}

impl ScanDiff {
    /// Compute a diff by statement id when the provider did not supply one.
    ///
    /// Ids only present in `newer` are added, ids only present in `older` are removed, and
    /// ids present in both whose description, directive or role differ are modified.
    pub fn between(older: Vec<Fragment>, newer: Vec<Fragment>) -> Self {
        let older_by_id: HashMap<&FragmentId, &Fragment> =
            older.iter().map(|f| (&f.id, f)).collect();
        let newer_ids: HashSet<&FragmentId> = newer.iter().map(|f| &f.id).collect();

        let mut added = Vec::new();
        let mut modified = Vec::new();
        for fragment in &newer {
            match older_by_id.get(&fragment.id) {
                None => added.push(fragment.clone()),
                Some(old) if content_differs(old, fragment) => modified.push(ModifiedPair {
                    new: fragment.clone(),
                    old: (*old).clone(),
                }),
                Some(_) => {}
            }
        }

        let removed = older
            .iter()
            .filter(|f| !newer_ids.contains(&f.id))
            .cloned()
            .collect();

        Self {
            added,
            removed,
            modified,
            older,
            newer,
        }
    }
}

fn content_differs(old: &Fragment, new: &Fragment) -> bool {
    old.description != new.description || old.directive != new.directive || old.role != new.role
}

/// One statement of the merged two-scan list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    /// The statement, with its diff tag set
    pub fragment: Fragment,
    pub status: DiffStatus,
    pub source: ScanSource,
    /// Position of the statement within its own scan
    pub ordinal: usize,
    /// Previous value for `modified_new` entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Fragment>,
}

/// Kind of a word-level change between two descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WordChangeKind {
    Equal,
    Inserted,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordChange {
    pub kind: WordChangeKind,
    pub text: String,
}

impl DiffEntry {
    fn new(fragment: &Fragment, status: DiffStatus, source: ScanSource, ordinal: usize) -> Self {
        Self {
            fragment: fragment.clone().with_diff(DiffTag { status, source }),
            status,
            source,
            ordinal,
            previous: None,
        }
    }

    /// Word-level changes from the previous description to the current one.
    ///
    /// Empty for anything but `modified_new` entries.
    pub fn word_changes(&self) -> Vec<WordChange> {
        let Some(previous) = &self.previous else {
            return Vec::new();
        };
        let diff = TextDiff::from_words(previous.text(), self.fragment.text());
        diff.iter_all_changes()
            .map(|change| WordChange {
                kind: match change.tag() {
                    ChangeTag::Equal => WordChangeKind::Equal,
                    ChangeTag::Insert => WordChangeKind::Inserted,
                    ChangeTag::Delete => WordChangeKind::Deleted,
                },
                text: change.value().to_string(),
            })
            .collect()
    }
}

/// Build the merged, status-tagged list for a unified two-scan rendering.
pub fn classify(diff: &ScanDiff) -> Vec<DiffEntry> {
    let added: HashSet<&FragmentId> = diff.added.iter().map(|f| &f.id).collect();
    let previous: HashMap<&FragmentId, &Fragment> =
        diff.modified.iter().map(|pair| (&pair.new.id, &pair.old)).collect();

    let mut merged: Vec<DiffEntry> = diff
        .newer
        .iter()
        .enumerate()
        .map(|(ordinal, fragment)| {
            if added.contains(&fragment.id) {
                DiffEntry::new(fragment, DiffStatus::Added, ScanSource::Newer, ordinal)
            } else if let Some(old) = previous.get(&fragment.id) {
                let mut entry =
                    DiffEntry::new(fragment, DiffStatus::ModifiedNew, ScanSource::Newer, ordinal);
                entry.previous = Some((*old).clone());
                entry
            } else {
                DiffEntry::new(fragment, DiffStatus::Unchanged, ScanSource::Newer, ordinal)
            }
        })
        .collect();

    let older_ordinal: HashMap<&FragmentId, usize> = diff
        .older
        .iter()
        .enumerate()
        .map(|(ordinal, f)| (&f.id, ordinal))
        .collect();

    let mut removed: Vec<(usize, &Fragment)> = diff
        .removed
        .iter()
        .enumerate()
        .map(|(index, fragment)| {
            let ordinal = older_ordinal
                .get(&fragment.id)
                .copied()
                .unwrap_or(diff.older.len().max(diff.newer.len()) + index);
            (ordinal, fragment)
        })
        .collect();
    removed.sort_by_key(|&(ordinal, _)| ordinal);

    for (ordinal, fragment) in removed {
        let entry = DiffEntry::new(fragment, DiffStatus::Removed, ScanSource::Older, ordinal);
        match merged.iter().position(|existing| existing.ordinal >= ordinal) {
            Some(index) => merged.insert(index, entry),
            None => merged.push(entry),
        }
    }

    tracing::debug!(
        entries = merged.len(),
        added = diff.added.len(),
        removed = diff.removed.len(),
        modified = diff.modified.len(),
        "classified scan diff"
    );
    merged
}

/// Fragments of a classified list, ready for the locate/merge pipeline.
pub fn classified_fragments(entries: &[DiffEntry]) -> Vec<Fragment> {
    entries.iter().map(|entry| entry.fragment.clone()).collect()
}

/// Per-scan metadata resolved through an entry's source tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPair {
    pub older: ScanMetadata,
    pub newer: ScanMetadata,
}

impl ScanPair {
    pub fn resolve(&self, source: ScanSource) -> &ScanMetadata {
        match source {
            ScanSource::Newer => &self.newer,
            ScanSource::Older => &self.older,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(id: &str, text: &str) -> Fragment {
        Fragment::new(id, text)
    }

    fn sample_diff() -> ScanDiff {
        let older = vec![
            f("a", "Alpha clause text."),
            f("b", "Bravo clause text."),
            f("c", "Charlie clause text."),
            f("d", "Delta clause text."),
        ];
        let newer = vec![
            f("a", "Alpha clause text."),
            f("c", "Charlie clause text, revised."),
            f("e", "Echo clause text."),
        ];
        ScanDiff::between(older, newer)
    }

    #[test]
    fn between_detects_all_three_kinds() {
        let diff = sample_diff();
        let ids = |list: &[Fragment]| list.iter().map(|f| f.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&diff.added), ["e"]);
        assert_eq!(ids(&diff.removed), ["b", "d"]);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified[0].old.text(), "Charlie clause text.");
    }

    #[test]
    fn classify_splices_removed_by_older_ordinal() {
        let entries = classify(&sample_diff());
        let order: Vec<(&str, DiffStatus)> = entries
            .iter()
            .map(|e| (e.fragment.id.as_str(), e.status))
            .collect();
        assert_eq!(
            order,
            [
                ("a", DiffStatus::Unchanged),
                ("b", DiffStatus::Removed),
                ("c", DiffStatus::ModifiedNew),
                ("e", DiffStatus::Added),
                ("d", DiffStatus::Removed),
            ]
        );
    }

    #[test]
    fn entries_carry_source_and_previous_value() {
        let entries = classify(&sample_diff());
        let removed = entries.iter().find(|e| e.fragment.id.as_str() == "b").unwrap();
        assert_eq!(removed.source, ScanSource::Older);
        assert_eq!(
            removed.fragment.diff,
            Some(DiffTag {
                status: DiffStatus::Removed,
                source: ScanSource::Older
            })
        );

        let modified = entries.iter().find(|e| e.fragment.id.as_str() == "c").unwrap();
        assert_eq!(modified.previous.as_ref().map(Fragment::text), Some("Charlie clause text."));
    }

    #[test]
    fn removed_without_older_ordinal_is_appended() {
        let diff = ScanDiff {
            removed: vec![f("x", "Gone statement here.")],
            newer: vec![f("a", "Alpha"), f("b", "Bravo")],
            ..ScanDiff::default()
        };
        let entries = classify(&diff);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].fragment.id.as_str(), "x");
    }

    #[test]
    fn word_changes_describe_the_edit() {
        let entries = classify(&sample_diff());
        let modified = entries.iter().find(|e| e.status == DiffStatus::ModifiedNew).unwrap();
        let changes = modified.word_changes();
        assert!(changes
            .iter()
            .any(|c| c.kind == WordChangeKind::Inserted && c.text.contains("revised")));
        assert!(changes
            .iter()
            .any(|c| c.kind == WordChangeKind::Deleted && c.text.contains("text.")));
    }

    #[test]
    fn labels_and_styling() {
        assert_eq!(DiffStatus::Added.label(), Some("Added"));
        assert_eq!(DiffStatus::ModifiedNew.label(), Some("Modified"));
        assert_eq!(DiffStatus::Unchanged.label(), None);
        assert!(DiffStatus::Removed.suppresses_styling());
        assert!(!DiffStatus::Added.suppresses_styling());
    }

    #[test]
    fn scan_pair_resolves_by_source() {
        let pair = ScanPair {
            older: ScanMetadata {
                label: "Scan 1".into(),
                scanned_at: Some("2026-01-04".into()),
            },
            newer: ScanMetadata {
                label: "Scan 2".into(),
                scanned_at: None,
            },
        };
        assert_eq!(pair.resolve(ScanSource::Older).label, "Scan 1");
        assert_eq!(pair.resolve(ScanSource::Newer).scanned_at, None);
    }

    #[test]
    fn provider_diff_shape_deserializes() {
        let json = r#"{
            "added": [{"id": 3, "description": "new"}],
            "removed": [],
            "modified": [{"new": {"id": 1, "description": "x2"}, "old": {"id": 1, "description": "x"}}],
            "statementsScan1": [{"id": 1, "description": "x"}],
            "statementsScan2": [{"id": 1, "description": "x2"}, {"id": 3, "description": "new"}]
        }"#;
        let diff: ScanDiff = serde_json::from_str(json).unwrap();
        let entries = classify(&diff);
        assert_eq!(entries[0].status, DiffStatus::ModifiedNew);
        assert_eq!(entries[1].status, DiffStatus::Added);
    }
}
