#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{cluster_role, config_map, resource};
use kubediff_core::diff::model::Classification;
use kubediff_core::diff::report::format_resources;
use kubediff_core::resource::{filter_resources, with_kind};
use kubediff_core::{reconcile, DiffConfig, DiffError, Identity, ResourceDocument};

// ---- Helpers

fn role_identity(name: &str) -> Identity {
    Identity::new("rbac.authorization.k8s.io", "v1", "ClusterRole", name)
}

fn names(docs: &[ResourceDocument]) -> Vec<&str> {
    docs.iter().map(|d| d.name()).collect()
}

fn scenario() -> (Vec<ResourceDocument>, Vec<ResourceDocument>) {
    let a = vec![
        cluster_role("kube-inspect-foo", &["get"]),
        cluster_role("kube-inspect-bar", &["get"]),
    ];
    let b = vec![
        cluster_role("kube-inspect-bar", &["get", "list"]),
        cluster_role("kube-inspect-baz", &["get"]),
    ];
    (a, b)
}

// ---- Classification

#[test]
fn test_added_removed_changed() {
    let (mut a, mut b) = scenario();
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());

    assert_eq!(names(&diff.removed), vec!["foo"]);
    assert_eq!(names(&diff.added), vec!["baz"]);
    assert_eq!(
        diff.changed.keys().cloned().collect::<Vec<_>>(),
        vec![role_identity("bar")]
    );
    assert!(diff.unchanged.is_empty());
    assert!(diff.errors.is_empty());
}

#[test]
fn test_report_for_scenario() {
    let (mut a, mut b) = scenario();
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());

    assert_eq!(
        format_resources(&diff),
        "Added (1):\n\
         + rbac.authorization.k8s.io/v1/ClusterRole/baz\n\
         \n\
         Removed (1):\n\
         - rbac.authorization.k8s.io/v1/ClusterRole/foo\n\
         \n\
         Changed (1):\n\
         \n\
         ### rbac.authorization.k8s.io/v1/ClusterRole/bar\n\
         \n\
         @@ rules.0.verbs @@\n\
         ! + one list entry added:\n\
         + - list\n\
         \n\
         Unchanged: zero resources"
    );
}

#[test]
fn test_swapping_sets_swaps_added_and_removed() {
    let (mut a, mut b) = scenario();
    let forward = reconcile(&mut a, &mut b, &DiffConfig::default());
    let (mut a, mut b) = scenario();
    let backward = reconcile(&mut b, &mut a, &DiffConfig::default());

    assert_eq!(names(&forward.added), names(&backward.removed));
    assert_eq!(names(&forward.removed), names(&backward.added));
    assert_eq!(
        forward.changed.keys().collect::<Vec<_>>(),
        backward.changed.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_every_identity_in_exactly_one_bucket() {
    let (mut a, mut b) = scenario();
    a.push(config_map("kube-inspect-settings", "mode", "fast"));
    b.push(config_map("settings", "mode", "fast"));
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());

    let expected = [
        (role_identity("foo"), Classification::Removed),
        (role_identity("bar"), Classification::Changed),
        (role_identity("baz"), Classification::Added),
        (
            Identity::new("", "v1", "ConfigMap", "settings"),
            Classification::Unchanged,
        ),
    ];
    for (identity, bucket) in &expected {
        assert_eq!(diff.classification_of(identity), Some(*bucket), "{}", identity);
    }
    let total = diff.added.len()
        + diff.removed.len()
        + diff.changed.len()
        + diff.unchanged.len()
        + diff.errors.len();
    assert_eq!(total, expected.len());
}

#[test]
fn test_buckets_sorted_by_identity() {
    let mut a: Vec<ResourceDocument> = vec![];
    let mut b = vec![
        config_map("zeta", "k", "v"),
        cluster_role("alpha", &["get"]),
        config_map("alpha", "k", "v"),
    ];
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());
    let identities: Vec<String> = diff.added.iter().map(|d| d.identity().to_string()).collect();
    assert_eq!(
        identities,
        vec![
            "v1/ConfigMap/alpha",
            "v1/ConfigMap/zeta",
            "rbac.authorization.k8s.io/v1/ClusterRole/alpha",
        ]
    );
}

#[test]
fn test_identical_sets_are_all_unchanged() {
    let (mut a, _) = scenario();
    let (mut b, _) = scenario();
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());
    assert!(diff.is_empty());
    assert_eq!(diff.unchanged.len(), 2);
}

#[test]
fn test_empty_sets() {
    let diff = reconcile(&mut [], &mut [], &DiffConfig::default());
    assert!(diff.is_empty());
    assert!(diff.unchanged.is_empty());
}

// ---- Identity normalization

#[test]
fn test_prefix_only_on_one_side_still_matches() {
    let mut a = vec![config_map("kube-inspect-settings", "mode", "fast")];
    let mut b = vec![config_map("settings", "mode", "slow")];
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());
    assert_eq!(diff.changed.len(), 1);
    assert_eq!(a[0].name(), "settings");
    assert_eq!(a[0].tree()["metadata"]["name"].as_str(), Some("settings"));
}

#[test]
fn test_same_name_in_different_groups_are_distinct() {
    let mut a = vec![cluster_role("shared", &["get"])];
    let mut b = vec![config_map("shared", "k", "v")];
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.added.len(), 1);
}

// ---- Failures

#[test]
fn test_duplicate_identity_in_both_sets() {
    let mut a = vec![
        config_map("kube-inspect-x", "k", "1"),
        config_map("x", "k", "2"),
    ];
    let mut b = vec![
        config_map("x", "k", "1"),
        config_map("kube-inspect-x", "k", "3"),
        config_map("kube-inspect-x", "k", "4"),
    ];
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());

    let identity = Identity::new("", "v1", "ConfigMap", "x");
    assert_eq!(diff.classification_of(&identity), Some(Classification::Errored));
    match diff.errors.get(&identity) {
        Some(DiffError::DuplicateIdentity { side, count, .. }) => {
            assert_eq!(side, "A and B");
            assert_eq!(*count, 3);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_malformed_resource_does_not_block_others() {
    let mut a = vec![
        resource("apiVersion: v1\nkind: Secret\nmetadata:\n  name: creds\ndata:\n  ? [a, b]\n  : c\n"),
        config_map("settings", "mode", "fast"),
    ];
    let mut b = vec![
        resource("apiVersion: v1\nkind: Secret\nmetadata:\n  name: creds\ndata: {}\n"),
        config_map("settings", "mode", "fast"),
    ];
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());

    let creds = Identity::new("", "v1", "Secret", "creds");
    assert!(matches!(
        diff.errors.get(&creds),
        Some(DiffError::MalformedTree { path, .. }) if path == "data"
    ));
    assert_eq!(diff.unchanged.len(), 1);
}

// ---- Filters

#[test]
fn test_filter_before_reconcile() {
    let (a, b) = scenario();
    let mut a: Vec<ResourceDocument> = filter_resources(&a, &[with_kind("ClusterRole")])
        .into_iter()
        .cloned()
        .collect();
    let mut b: Vec<ResourceDocument> = filter_resources(&b, &[with_kind("ConfigMap")])
        .into_iter()
        .cloned()
        .collect();
    let diff = reconcile(&mut a, &mut b, &DiffConfig::default());
    assert_eq!(diff.removed.len(), 2);
    assert!(diff.added.is_empty());
}
