//! Property tests for manifest resolution.

use kgh_manifest::{Manifest, ManifestEntry};
use kgh_redirect::{ResolveError, Resolver};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy)]
enum Fate {
    Unchanged,
    Moved,
    Removed,
}

fn fate() -> impl Strategy<Value = Fate> {
    prop_oneof![Just(Fate::Unchanged), Just(Fate::Moved), Just(Fate::Removed)]
}

fn old_url(key: &str) -> String {
    format!("https://kg-hub.berkeleybop.io/{key}/current/graph.tar.gz")
}

fn new_url(key: &str) -> String {
    format!("https://kg-hub.berkeleybop.io/{key}/20220301/graph.tar.gz")
}

/// Old and new snapshots whose URL changes never overlap
fn snapshots(
    fates: &BTreeMap<String, Fate>,
    added: &BTreeSet<String>,
) -> (Manifest, Manifest) {
    let old = fates
        .keys()
        .map(|k| ManifestEntry::new(k.clone(), old_url(k)))
        .collect();
    let new = fates
        .iter()
        .filter_map(|(k, fate)| match fate {
            Fate::Unchanged => Some(ManifestEntry::new(k.clone(), old_url(k))),
            Fate::Moved => Some(ManifestEntry::new(k.clone(), new_url(k))),
            Fate::Removed => None,
        })
        .chain(added.iter().map(|k| ManifestEntry::new(k.clone(), new_url(k))))
        .collect();
    (old, new)
}

proptest! {
    #[test]
    fn prop_identical_manifests_need_no_redirects(
        fates in prop::collection::btree_map("[a-z]{1,8}", fate(), 0..40),
    ) {
        let (old, _) = snapshots(&fates, &BTreeSet::new());
        let resolution = Resolver::default().resolve(&old, &old).unwrap();
        prop_assert!(resolution.instructions.is_empty());
        prop_assert!(resolution.orphans.is_empty());
        prop_assert_eq!(resolution.unchanged, old.len());
    }

    #[test]
    fn prop_one_instruction_per_moved_key(
        fates in prop::collection::btree_map("[a-z]{1,8}", fate(), 0..40),
        added in prop::collection::btree_set("[A-Z]{1,8}", 0..10),
    ) {
        let (old, new) = snapshots(&fates, &added);
        let resolution = Resolver::default().resolve(&old, &new).unwrap();

        let moved: Vec<&String> = fates
            .iter()
            .filter(|(_, f)| matches!(f, Fate::Moved))
            .map(|(k, _)| k)
            .collect();
        prop_assert_eq!(resolution.instructions.len(), moved.len());

        for (instruction, key) in resolution.instructions.iter().zip(moved) {
            prop_assert_eq!(instruction.object_key(), key.as_str());
            prop_assert_eq!(instruction.source_path(), old_url(key));
            prop_assert_eq!(instruction.target_path(), new_url(key));
        }
        prop_assert_eq!(resolution.added.len(), added.len());
    }

    #[test]
    fn prop_orphans_are_never_sources(
        fates in prop::collection::btree_map("[a-z]{1,8}", fate(), 0..40),
    ) {
        let (old, new) = snapshots(&fates, &BTreeSet::new());
        let resolution = Resolver::default().resolve(&old, &new).unwrap();

        for orphan in &resolution.orphans {
            prop_assert!(resolution
                .instructions
                .iter()
                .all(|i| i.source_path() != orphan.download_url));
        }
        let removed = fates.values().filter(|f| matches!(f, Fate::Removed)).count();
        prop_assert_eq!(resolution.orphans.len(), removed);
    }

    #[test]
    fn prop_resolution_is_idempotent_after_apply(
        fates in prop::collection::btree_map("[a-z]{1,8}", fate(), 0..40),
        added in prop::collection::btree_set("[A-Z]{1,8}", 0..10),
    ) {
        let (old, new) = snapshots(&fates, &added);
        let resolver = Resolver::default();

        let first = resolver.resolve(&old, &new).unwrap();
        let again = resolver.resolve(&old, &new).unwrap();
        prop_assert_eq!(&first, &again);

        // once applied, the new snapshot is the published state
        let after = resolver.resolve(&new, &new).unwrap();
        prop_assert!(after.instructions.is_empty());
    }
}

#[test]
fn swapped_urls_are_refused() {
    let old: Manifest = vec![
        ManifestEntry::new("A", "/url1"),
        ManifestEntry::new("B", "/url2"),
    ]
    .into_iter()
    .collect();
    let new: Manifest = vec![
        ManifestEntry::new("A", "/url2"),
        ManifestEntry::new("B", "/url1"),
    ]
    .into_iter()
    .collect();

    let result = Resolver::default().resolve(&old, &new);
    assert!(matches!(
        result,
        Err(ResolveError::RedirectCycleDetected { .. })
    ));
}
