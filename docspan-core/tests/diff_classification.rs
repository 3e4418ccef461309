//! Two-scan diff classification

use docspan_core::align::{
    align_flat, classified_fragments, classify, DiffStatus, Fragment, FragmentId, LocatorConfig,
    NormalizationCache, ScanDiff, ScanSource,
};
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeSet;

fn statement(id: u64) -> Fragment {
    Fragment::new(id, format!("statement number {id}"))
}

#[test]
fn provider_diff_deserializes_with_scan_field_names() {
    let json = r#"{
        "added": [{"id": 3, "description": "New clause"}],
        "removed": [{"id": "2", "description": "Old clause"}],
        "modified": [{
            "new": {"id": 1, "description": "The vendor shall pay within 10 days"},
            "old": {"id": 1, "description": "The vendor shall pay within 30 days"}
        }],
        "statementsScan1": [
            {"id": 1, "description": "The vendor shall pay within 30 days"},
            {"id": "2", "description": "Old clause"}
        ],
        "statementsScan2": [
            {"id": 1, "description": "The vendor shall pay within 10 days", "directiveKeyword": "shall"},
            {"id": 3, "description": "New clause", "isHeader": false}
        ]
    }"#;
    let diff: ScanDiff = serde_json::from_str(json).unwrap();
    let entries = classify(&diff);

    let summary: Vec<(&str, DiffStatus, ScanSource)> = entries
        .iter()
        .map(|e| (e.fragment.id.as_str(), e.status, e.source))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("1", DiffStatus::ModifiedNew, ScanSource::Newer),
            ("2", DiffStatus::Removed, ScanSource::Older),
            ("3", DiffStatus::Added, ScanSource::Newer),
        ]
    );
    assert_eq!(entries[0].fragment.directive.as_deref(), Some("shall"));
    assert!(entries[0]
        .word_changes()
        .iter()
        .any(|change| change.text == "10"));
}

#[rstest(
    status,
    label,
    case(DiffStatus::Added, Some("Added")),
    case(DiffStatus::Removed, Some("Removed")),
    case(DiffStatus::ModifiedNew, Some("Modified")),
    case(DiffStatus::Unchanged, None)
)]
fn status_labels(status: DiffStatus, label: Option<&str>) {
    assert_eq!(status.label(), label);
    assert_eq!(status.suppresses_styling(), status == DiffStatus::Removed);
}

#[test]
fn classified_statements_flow_into_alignment() {
    let document = "The vendor shall deliver the goods. The buyer shall inspect the goods.";
    let older = vec![
        Fragment::new("1", "The vendor shall deliver the goods."),
        Fragment::new("2", "The buyer may reject the goods."),
    ];
    let newer = vec![
        Fragment::new("1", "The vendor shall deliver the goods."),
        Fragment::new("3", "The buyer shall inspect the goods."),
    ];
    let entries = classify(&ScanDiff::between(older, newer));
    let fragments = classified_fragments(&entries);

    let mut cache = NormalizationCache::new();
    let alignment = align_flat(document, &fragments, &LocatorConfig::default(), &mut cache).unwrap();

    assert_eq!(alignment.spans.len(), 2);
    assert_eq!(
        alignment.spans[1].diff.map(|tag| tag.status),
        Some(DiffStatus::Added)
    );
    assert_eq!(alignment.unmatched, vec![FragmentId::from("2")]);
}

/// Older and newer id sets drawn from a small universe so they overlap
fn scan_strategy() -> impl Strategy<Value = (Vec<u64>, Vec<u64>)> {
    (
        prop::collection::btree_set(0u64..30, 0..15),
        prop::collection::btree_set(0u64..30, 0..15),
    )
        .prop_map(|(older, newer)| (older.into_iter().collect(), newer.into_iter().collect()))
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn merged_list_has_newer_plus_removed_entries((older, newer) in scan_strategy()) {
            let diff = ScanDiff::between(
                older.iter().copied().map(statement).collect(),
                newer.iter().copied().map(statement).collect(),
            );
            let entries = classify(&diff);

            prop_assert_eq!(entries.len(), diff.newer.len() + diff.removed.len());

            let newer_ids: Vec<&FragmentId> = entries
                .iter()
                .filter(|e| e.source == ScanSource::Newer)
                .map(|e| &e.fragment.id)
                .collect();
            let expected: Vec<&FragmentId> = diff.newer.iter().map(|f| &f.id).collect();
            prop_assert_eq!(newer_ids, expected);

            let removed: BTreeSet<&str> = entries
                .iter()
                .filter(|e| e.status == DiffStatus::Removed)
                .map(|e| e.fragment.id.as_str())
                .collect();
            let only_older: BTreeSet<String> = older
                .iter()
                .filter(|id| !newer.contains(id))
                .map(|id| id.to_string())
                .collect();
            let expected_removed: BTreeSet<&str> = only_older.iter().map(String::as_str).collect();
            prop_assert_eq!(removed, expected_removed);

            for entry in &entries {
                prop_assert_eq!(entry.fragment.diff.map(|tag| tag.status), Some(entry.status));
            }
        }
    }
}
