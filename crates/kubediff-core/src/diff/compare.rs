//! Structural tree comparator.
//!
//! Walks two trees in lockstep and emits [`DifferenceRecord`]s in a fixed
//! traversal order:
//!
//! - map keys are visited in lexicographic order, so insertion order of the
//!   input mappings never affects the output
//! - at each map, one grouped removal and one grouped addition are emitted
//!   before descending into the common keys
//! - lists of maps that share a unique identifying field (`name`, `key`,
//!   `id`, `metadata.name`) are matched by that field
//! - other lists are matched by element equality; what is left over is
//!   paired by similarity when rename detection is on, and same-index
//!   containers that stay unpaired are aligned positionally
//!
//! Both trees are validated before any record is produced, so a malformed
//! tree fails the whole comparison instead of yielding a partial result.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::{Mapping, Value};

use crate::config::CompareOptions;
use crate::diff::model::{DiffKind, DiffResult, DifferenceRecord, Path, PathElement};
use crate::errors::Result;
use crate::tree::{self, Shape};

/// Minimum similarity (exclusive) for two unmatched list elements to be
/// reported as one renamed or moved element
pub const RENAME_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Fields tried, in order, when matching list elements by identity
pub const IDENTIFIER_FIELDS: [&str; 4] = ["name", "key", "id", "metadata.name"];

/// Compare two trees and return every difference between them
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` if either tree contains a tagged node,
/// a non-scalar mapping key, or keys that collide once rendered as text.
/// Tree A is checked before tree B.
pub fn compare_trees(a: &Value, b: &Value, options: &CompareOptions) -> Result<DiffResult> {
    tree::validate(a, &Path::root())?;
    tree::validate(b, &Path::root())?;

    let mut comparator = Comparator {
        options,
        records: Vec::new(),
    };
    comparator.node(&Path::root(), a, b)?;
    Ok(DiffResult::new(comparator.records))
}

struct Comparator<'o> {
    options: &'o CompareOptions,
    records: Vec<DifferenceRecord>,
}

impl Comparator<'_> {
    fn push(&mut self, record: DifferenceRecord) {
        self.records.push(record);
    }

    fn node(&mut self, path: &Path, a: &Value, b: &Value) -> Result<()> {
        match (a, b) {
            (Value::Mapping(ma), Value::Mapping(mb)) => self.maps(path, ma, mb),
            (Value::Sequence(la), Value::Sequence(lb)) => self.lists(path, la, lb),
            _ if tree::shape(a) == Shape::Scalar && tree::shape(b) == Shape::Scalar => {
                self.scalars(path, a, b);
                Ok(())
            }
            _ => {
                self.push(DifferenceRecord::change(
                    path.clone(),
                    DiffKind::TypeChange,
                    a.clone(),
                    b.clone(),
                ));
                Ok(())
            }
        }
    }

    fn scalars(&mut self, path: &Path, a: &Value, b: &Value) {
        if tree::scalars_equal(a, b, self.options) {
            return;
        }
        let kind = if tree::type_name(a) == tree::type_name(b) {
            DiffKind::ValueChange
        } else {
            DiffKind::TypeChange
        };
        self.push(DifferenceRecord::change(
            path.clone(),
            kind,
            a.clone(),
            b.clone(),
        ));
    }

    fn maps(&mut self, path: &Path, a: &Mapping, b: &Mapping) -> Result<()> {
        let entries_a = tree::sorted_entries(a, path)?;
        let entries_b = tree::sorted_entries(b, path)?;

        let removed: Mapping = entries_a
            .iter()
            .filter(|(key, _)| !entries_b.contains_key(*key))
            .map(|(_, (key, value))| ((*key).clone(), (*value).clone()))
            .collect();
        let added: Mapping = entries_b
            .iter()
            .filter(|(key, _)| !entries_a.contains_key(*key))
            .map(|(_, (key, value))| ((*key).clone(), (*value).clone()))
            .collect();

        if !removed.is_empty() {
            self.push(DifferenceRecord::removal(
                path.clone(),
                Value::Mapping(removed),
            ));
        }
        if !added.is_empty() {
            self.push(DifferenceRecord::addition(path.clone(), Value::Mapping(added)));
        }

        for (key, (_, value_a)) in &entries_a {
            if let Some((_, value_b)) = entries_b.get(key) {
                self.node(&path.child(PathElement::Key(key.clone())), value_a, value_b)?;
            }
        }
        Ok(())
    }

    fn lists(&mut self, path: &Path, a: &[Value], b: &[Value]) -> Result<()> {
        if self.options.domain_entity_detection {
            if let Some(field) = identifier_field(a, b) {
                return self.entity_lists(path, field, a, b);
            }
        }
        self.plain_lists(path, a, b)
    }

    /// Lists whose elements are matched by an identifying field
    fn entity_lists(&mut self, path: &Path, field: &str, a: &[Value], b: &[Value]) -> Result<()> {
        let ids_a: Vec<&str> = a.iter().filter_map(|e| tree::field_value(e, field)).collect();
        let ids_b: Vec<&str> = b.iter().filter_map(|e| tree::field_value(e, field)).collect();
        let by_id_a: BTreeMap<&str, &Value> = ids_a.iter().copied().zip(a).collect();
        let by_id_b: BTreeMap<&str, &Value> = ids_b.iter().copied().zip(b).collect();

        let common_a: Vec<&str> = ids_a
            .iter()
            .copied()
            .filter(|id| by_id_b.contains_key(id))
            .collect();
        let common_b: Vec<&str> = ids_b
            .iter()
            .copied()
            .filter(|id| by_id_a.contains_key(id))
            .collect();

        if !self.options.ignore_order_changes && common_a != common_b {
            self.push(DifferenceRecord::change(
                path.clone(),
                DiffKind::OrderChange,
                id_list(&common_a),
                id_list(&common_b),
            ));
        }

        let removed: Vec<Value> = ids_a
            .iter()
            .zip(a)
            .filter(|(id, _)| !by_id_b.contains_key(*id))
            .map(|(_, element)| element.clone())
            .collect();
        let added: Vec<Value> = ids_b
            .iter()
            .zip(b)
            .filter(|(id, _)| !by_id_a.contains_key(*id))
            .map(|(_, element)| element.clone())
            .collect();

        if !removed.is_empty() {
            self.push(DifferenceRecord::removal(path.clone(), Value::Sequence(removed)));
        }
        if !added.is_empty() {
            self.push(DifferenceRecord::addition(path.clone(), Value::Sequence(added)));
        }

        for id in &common_a {
            if let (Some(element_a), Some(element_b)) = (by_id_a.get(id), by_id_b.get(id)) {
                let child = path.child(PathElement::Entry {
                    field: field.to_string(),
                    value: (*id).to_string(),
                });
                self.node(&child, element_a, element_b)?;
            }
        }
        Ok(())
    }

    /// Lists without a usable identifying field
    fn plain_lists(&mut self, path: &Path, a: &[Value], b: &[Value]) -> Result<()> {
        let pairing = self.pair_equal(a, b);
        let matched_b: BTreeSet<usize> = pairing.iter().flatten().copied().collect();
        let unmatched_a: Vec<usize> = (0..a.len()).filter(|i| pairing[*i].is_none()).collect();
        let unmatched_b: Vec<usize> = (0..b.len()).filter(|j| !matched_b.contains(j)).collect();

        if unmatched_a.is_empty() && unmatched_b.is_empty() {
            let in_order = a
                .iter()
                .zip(b)
                .all(|(x, y)| tree::equivalent(x, y, self.options));
            if !in_order && !self.options.ignore_order_changes {
                self.push(DifferenceRecord::change(
                    path.clone(),
                    DiffKind::OrderChange,
                    Value::Sequence(a.to_vec()),
                    Value::Sequence(b.to_vec()),
                ));
            }
            return Ok(());
        }

        // A scored pair at the same index is an in-place edit, not a move
        let scored = if self.options.detect_renames {
            pair_renames(a, b, &unmatched_a, &unmatched_b)
        } else {
            Vec::new()
        };
        let paired_b: BTreeSet<usize> = scored.iter().map(|(_, j)| *j).collect();
        let paired_a: BTreeSet<usize> = scored.iter().map(|(i, _)| *i).collect();
        let (in_place, renames): (Vec<(usize, usize)>, Vec<(usize, usize)>) =
            scored.into_iter().partition(|(i, j)| i == j);

        // Leftover same-index containers are the same element edited in place
        let mut aligned: BTreeSet<usize> = in_place.iter().map(|(i, _)| *i).collect();
        aligned.extend(unmatched_a.iter().copied().filter(|i| {
            !paired_a.contains(i)
                && !paired_b.contains(i)
                && unmatched_b.contains(i)
                && tree::shape(&a[*i]) != Shape::Scalar
                && tree::shape(&a[*i]) == tree::shape(&b[*i])
        }));
        let rest_a: Vec<usize> = unmatched_a
            .iter()
            .copied()
            .filter(|i| !aligned.contains(i))
            .collect();
        let rest_b: Vec<usize> = unmatched_b
            .iter()
            .copied()
            .filter(|j| !aligned.contains(j))
            .collect();
        let renamed_a: BTreeSet<usize> = renames.iter().map(|(i, _)| *i).collect();
        let renamed_b: BTreeSet<usize> = renames.iter().map(|(_, j)| *j).collect();

        let removed: Vec<Value> = rest_a
            .iter()
            .filter(|i| !renamed_a.contains(i))
            .map(|i| a[*i].clone())
            .collect();
        let added: Vec<Value> = rest_b
            .iter()
            .filter(|j| !renamed_b.contains(j))
            .map(|j| b[*j].clone())
            .collect();

        if !removed.is_empty() {
            self.push(DifferenceRecord::removal(path.clone(), Value::Sequence(removed)));
        }
        if !added.is_empty() {
            self.push(DifferenceRecord::addition(path.clone(), Value::Sequence(added)));
        }

        // Descend in A-index order: aligned elements recurse, renames are leaves
        let mut children: Vec<(usize, Option<usize>)> = aligned
            .iter()
            .map(|i| (*i, None))
            .chain(renames.iter().map(|(i, j)| (*i, Some(*j))))
            .collect();
        children.sort_unstable();

        for (i, renamed_to) in children {
            let child = path.child(PathElement::Index(i));
            match renamed_to {
                None => self.node(&child, &a[i], &b[i])?,
                Some(j) => self.push(DifferenceRecord::change(
                    child,
                    DiffKind::Rename,
                    a[i].clone(),
                    b[j].clone(),
                )),
            }
        }
        Ok(())
    }

    /// Pair each A element with an equal, unused B element
    ///
    /// Same-index pairs are taken first, then the nearest index, then the
    /// lowest index.
    fn pair_equal(&self, a: &[Value], b: &[Value]) -> Vec<Option<usize>> {
        let mut pairing: Vec<Option<usize>> = vec![None; a.len()];
        let mut used_b = vec![false; b.len()];

        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            if tree::equivalent(x, y, self.options) {
                pairing[i] = Some(i);
                used_b[i] = true;
            }
        }

        for (i, x) in a.iter().enumerate() {
            if pairing[i].is_some() {
                continue;
            }
            let nearest = b
                .iter()
                .enumerate()
                .filter(|(j, y)| !used_b[*j] && tree::equivalent(x, y, self.options))
                .map(|(j, _)| j)
                .min_by_key(|j| (i.abs_diff(*j), *j));
            if let Some(j) = nearest {
                pairing[i] = Some(j);
                used_b[j] = true;
            }
        }
        pairing
    }
}

/// First identifying field that is present and unique in every element of both lists
fn identifier_field(a: &[Value], b: &[Value]) -> Option<&'static str> {
    if a.is_empty() && b.is_empty() {
        return None;
    }
    IDENTIFIER_FIELDS
        .iter()
        .copied()
        .find(|field| tree::unique_field_values(a, field) && tree::unique_field_values(b, field))
}

/// Greedily pair leftover elements whose similarity clears the threshold
///
/// Candidates are ranked by score (highest first), then index distance, then
/// A index, then B index. Returned pairs are ordered by A index.
fn pair_renames(a: &[Value], b: &[Value], rest_a: &[usize], rest_b: &[usize]) -> Vec<(usize, usize)> {
    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for &i in rest_a {
        for &j in rest_b {
            let score = tree::similarity(&a[i], &b[j]);
            if score > RENAME_SIMILARITY_THRESHOLD {
                candidates.push((score, i, j));
            }
        }
    }
    candidates.sort_by(|x, y| {
        y.0.total_cmp(&x.0)
            .then_with(|| x.1.abs_diff(x.2).cmp(&y.1.abs_diff(y.2)))
            .then_with(|| x.1.cmp(&y.1))
            .then_with(|| x.2.cmp(&y.2))
    });

    let mut taken_a = BTreeSet::new();
    let mut taken_b = BTreeSet::new();
    let mut pairs = Vec::new();
    for (_, i, j) in candidates {
        if taken_a.contains(&i) || taken_b.contains(&j) {
            continue;
        }
        taken_a.insert(i);
        taken_b.insert(j);
        pairs.push((i, j));
    }
    pairs.sort_unstable();
    pairs
}

fn id_list(ids: &[&str]) -> Value {
    Value::Sequence(ids.iter().map(|id| Value::String((*id).to_string())).collect())
}
