//! Helpers over `serde_yaml::Value` trees
//!
//! The comparator treats a tree as maps (string keys), lists and scalars
//! (null, bool, int, float, string). YAML allows more than that: tagged
//! nodes and non-scalar mapping keys. [`validate`] rejects those up front
//! so the comparator can assume a well-formed tree.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::{Mapping, Value};

use crate::config::CompareOptions;
use crate::diff::model::{Path, PathElement};
use crate::errors::{DiffError, Result};

/// Coarse node shape used to decide how two nodes are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Map,
    List,
}

pub fn shape(value: &Value) -> Shape {
    match value {
        Value::Mapping(_) => Shape::Map,
        Value::Sequence(_) => Shape::List,
        _ => Shape::Scalar,
    }
}

/// Type name used in type-change annotations
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "map",
        Value::Tagged(_) => "tagged",
    }
}

/// Text of a mapping key, `None` for keys that are not scalars
pub fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}

/// Plain rendering of a scalar; containers fall back to [`compact`]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => s.clone(),
        other => compact(other),
    }
}

/// Single-line rendering of any node
pub fn compact(value: &Value) -> String {
    match value {
        Value::Sequence(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Mapping(_) => serde_json::to_string(value).unwrap_or_else(|_| {
            serde_yaml::to_string(value)
                .map(|s| s.trim_end().replace('\n', " "))
                .unwrap_or_default()
        }),
        other => scalar_text(other),
    }
}

/// Copy of `value` with every mapping rebuilt in lexicographic key order
///
/// Record fragments go through this so rendered output does not depend on
/// the key order of the input documents.
pub fn canonical(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(String, Value, Value)> = map
                .iter()
                .map(|(k, v)| (key_text(k).unwrap_or_default(), k.clone(), canonical(v)))
                .collect();
            entries.sort_by(|x, y| x.0.cmp(&y.0));
            Value::Mapping(entries.into_iter().map(|(_, k, v)| (k, v)).collect())
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reject nodes the comparator cannot address
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` naming the offending path for tagged
/// nodes, non-scalar mapping keys, and keys that collide once rendered as text.
pub fn validate(value: &Value, path: &Path) -> Result<()> {
    match value {
        Value::Tagged(tagged) => Err(DiffError::MalformedTree {
            path: path.to_string(),
            reason: format!("tagged node {} is not supported", tagged.tag),
        }),
        Value::Mapping(map) => {
            let entries = sorted_entries(map, path)?;
            for (key, (_, child)) in entries {
                validate(child, &path.child(PathElement::Key(key)))?;
            }
            Ok(())
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                validate(item, &path.child(PathElement::Index(index)))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Mapping entries keyed by key text, in lexicographic key order
///
/// The original key node is kept alongside the value so fragments can be
/// rebuilt faithfully.
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` for non-scalar keys or for two keys
/// that render to the same text (for example `1` and `"1"`).
pub fn sorted_entries<'a>(
    map: &'a Mapping,
    path: &Path,
) -> Result<BTreeMap<String, (&'a Value, &'a Value)>> {
    let mut entries = BTreeMap::new();
    for (key, value) in map {
        let text = key_text(key).ok_or_else(|| DiffError::MalformedTree {
            path: path.to_string(),
            reason: format!("mapping key of type {} is not a scalar", type_name(key)),
        })?;
        if entries.insert(text.clone(), (key, value)).is_some() {
            return Err(DiffError::MalformedTree {
                path: path.to_string(),
                reason: format!("duplicate mapping key '{}'", text),
            });
        }
    }
    Ok(entries)
}

/// Scalar equality honoring the whitespace option
pub fn scalars_equal(a: &Value, b: &Value, options: &CompareOptions) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) if options.ignore_whitespace_changes => {
            normalize_whitespace(x) == normalize_whitespace(y)
        }
        _ => a == b,
    }
}

/// Deep equality with map keys compared by text and scalars per [`scalars_equal`]
pub fn equivalent(a: &Value, b: &Value, options: &CompareOptions) -> bool {
    match (a, b) {
        (Value::Mapping(x), Value::Mapping(y)) => {
            if x.len() != y.len() {
                return false;
            }
            let root = Path::root();
            match (sorted_entries(x, &root), sorted_entries(y, &root)) {
                (Ok(ex), Ok(ey)) => ex.iter().zip(ey.iter()).all(|((kx, (_, vx)), (ky, (_, vy)))| {
                    kx == ky && equivalent(vx, vy, options)
                }),
                _ => false,
            }
        }
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equivalent(p, q, options))
        }
        (Value::Mapping(_), _) | (Value::Sequence(_), _) => false,
        (_, Value::Mapping(_)) | (_, Value::Sequence(_)) => false,
        _ => scalars_equal(a, b, options),
    }
}

/// Multiset of `path=value` leaves under a node
fn leaves(value: &Value, prefix: &str, out: &mut BTreeMap<String, usize>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = key_text(key).unwrap_or_default();
                leaves(child, &format!("{}/{}", prefix, key), out);
            }
        }
        Value::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                leaves(child, &format!("{}/{}", prefix, index), out);
            }
        }
        other => {
            *out.entry(format!("{}={}", prefix, scalar_text(other)))
                .or_insert(0) += 1;
        }
    }
}

/// Share of leaves two nodes have in common, in `[0, 1]`
///
/// Two scalars score 1 when equal and 0 otherwise. Containers score the size
/// of the common `path=value` leaf multiset over the larger leaf count.
pub fn similarity(a: &Value, b: &Value) -> f64 {
    if shape(a) == Shape::Scalar || shape(b) == Shape::Scalar {
        return if a == b { 1.0 } else { 0.0 };
    }
    let mut la = BTreeMap::new();
    let mut lb = BTreeMap::new();
    leaves(a, "", &mut la);
    leaves(b, "", &mut lb);
    let total_a: usize = la.values().sum();
    let total_b: usize = lb.values().sum();
    let larger = total_a.max(total_b);
    if larger == 0 {
        return if shape(a) == shape(b) { 1.0 } else { 0.0 };
    }
    let common: usize = la
        .iter()
        .map(|(leaf, count)| lb.get(leaf).map_or(0, |other| (*count).min(*other)))
        .sum();
    common as f64 / larger as f64
}

/// Identifying value of a list element under `field`, which may be dotted
pub fn field_value<'a>(element: &'a Value, field: &str) -> Option<&'a str> {
    let mut node = element;
    for part in field.split('.') {
        node = node.as_mapping()?.get(part)?;
    }
    node.as_str()
}

/// True when every element carries a string under `field` and no two agree
pub fn unique_field_values(items: &[Value], field: &str) -> bool {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .all(|item| field_value(item, field).is_some_and(|v| seen.insert(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&yaml("9402")), "int");
        assert_eq!(type_name(&yaml("1.5")), "float");
        assert_eq!(type_name(&yaml("http-metrics")), "string");
        assert_eq!(type_name(&yaml("true")), "bool");
        assert_eq!(type_name(&yaml("~")), "null");
        assert_eq!(type_name(&yaml("[1]")), "list");
        assert_eq!(type_name(&yaml("{a: 1}")), "map");
    }

    #[test]
    fn test_validate_rejects_tagged_node_with_path() {
        let tree = yaml("spec:\n  ports:\n    - !Ref other\n");
        let err = validate(&tree, &Path::root()).unwrap_err();
        match err {
            DiffError::MalformedTree { path, .. } => assert_eq!(path, "spec.ports.0"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_map_key() {
        let tree = yaml("? {a: 1}\n: value\n");
        assert!(matches!(
            validate(&tree, &Path::root()),
            Err(DiffError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_colliding_keys() {
        let tree = yaml("1: a\n\"1\": b\n");
        assert!(matches!(
            validate(&tree, &Path::root()),
            Err(DiffError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_equivalent_ignores_key_order() {
        let options = CompareOptions::default();
        assert!(equivalent(&yaml("{a: 1, b: 2}"), &yaml("{b: 2, a: 1}"), &options));
        assert!(!equivalent(&yaml("[1, 2]"), &yaml("[2, 1]"), &options));
    }

    #[test]
    fn test_whitespace_option() {
        let strict = CompareOptions::default();
        let relaxed = CompareOptions {
            ignore_whitespace_changes: true,
            ..CompareOptions::default()
        };
        let a = yaml("\"run  --fast\"");
        let b = yaml("\"run --fast \"");
        assert!(!scalars_equal(&a, &b, &strict));
        assert!(scalars_equal(&a, &b, &relaxed));
    }

    #[test]
    fn test_similarity_scores() {
        let a = yaml("{name: web, port: 80, protocol: TCP}");
        let b = yaml("{name: web, port: 8080, protocol: TCP}");
        let score = similarity(&a, &b);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(similarity(&yaml("1"), &yaml("2")), 0.0);
        assert_eq!(similarity(&yaml("{}"), &yaml("{}")), 1.0);
    }

    #[test]
    fn test_unique_field_values() {
        let items = yaml("[{name: a}, {name: b}]");
        let items = items.as_sequence().unwrap();
        assert!(unique_field_values(items, "name"));
        assert!(!unique_field_values(items, "id"));

        let dup = yaml("[{name: a}, {name: a}]");
        assert!(!unique_field_values(dup.as_sequence().unwrap(), "name"));
    }

    #[test]
    fn test_field_value_dotted() {
        let item = yaml("{metadata: {name: cm-1}}");
        assert_eq!(field_value(&item, "metadata.name"), Some("cm-1"));
    }

    #[test]
    fn test_compact_list() {
        assert_eq!(compact(&yaml("[b, a, 3]")), "b, a, 3");
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let value = canonical(&yaml("{b: {y: 1, x: 2}, a: [{d: 1, c: 2}]}"));
        assert_eq!(
            serde_yaml::to_string(&value).unwrap(),
            "a:\n- c: 2\n  d: 1\nb:\n  x: 2\n  y: 1\n"
        );
    }
}
