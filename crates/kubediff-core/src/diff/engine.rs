//! Diff engine.
//!
//! [`DiffEngine`] binds a [`DiffConfig`] to an optional caller-supplied
//! [`RequestContext`] and exposes the four operations: tree comparison,
//! resource-set reconciliation, value-tree diff and bundle diff. Each
//! operation runs inside an [`OpSpan`] so its start and end are logged once
//! with the caller's correlation identifiers.

use std::collections::BTreeMap;

use kubediff_core_types::schema::{
    OP_COMPARE, OP_DIFF_BUNDLES, OP_DIFF_VALUES, OP_RECONCILE,
};
use kubediff_core_types::RequestContext;
use serde_yaml::Value;

use crate::config::DiffConfig;
use crate::diff::compare::compare_trees;
use crate::diff::model::{Bundle, BundleDiff, DiffResult, ResourcesDiff};
use crate::errors::{DiffError, Result};
use crate::identity::{Identity, IdentityNormalizer};
use crate::logging_facility::OpSpan;
use crate::resource::ResourceDocument;

/// Comparison engine configured once and reused across calls
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
    context: Option<RequestContext>,
}

impl DiffEngine {
    pub fn new(config: DiffConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// Tag every span emitted by this engine with `context`
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    /// Compare two trees
    ///
    /// # Errors
    ///
    /// Returns `DiffError::MalformedTree` if either tree cannot be compared.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<DiffResult> {
        self.run_tree_op(OP_COMPARE, a, b)
    }

    /// Compare two configuration-value trees
    ///
    /// Identical to [`DiffEngine::compare`], logged under its own operation
    /// name so value diffs can be told apart from resource comparisons.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::MalformedTree` if either tree cannot be compared.
    pub fn diff_values(&self, a: &Value, b: &Value) -> Result<DiffResult> {
        self.run_tree_op(OP_DIFF_VALUES, a, b)
    }

    fn run_tree_op(&self, op: &'static str, a: &Value, b: &Value) -> Result<DiffResult> {
        let span = OpSpan::enter(op, self.context.as_ref());
        match compare_trees(a, b, &self.config.compare) {
            Ok(result) => {
                span.finish_with_records(result.len());
                Ok(result)
            }
            Err(err) => {
                span.fail(&err);
                Err(err)
            }
        }
    }

    /// Reconcile two resource sets
    ///
    /// Names are normalized in place on both sets, then every identity is
    /// placed in exactly one bucket of the returned [`ResourcesDiff`].
    /// Failures are per identity: an identity that appears more than once in
    /// a set, or whose trees are malformed, lands in `errors` and the rest of
    /// the sets are still reconciled.
    pub fn reconcile(
        &self,
        set_a: &mut [ResourceDocument],
        set_b: &mut [ResourceDocument],
    ) -> ResourcesDiff {
        let span = OpSpan::enter(OP_RECONCILE, self.context.as_ref());
        let normalizer = IdentityNormalizer::new(self.config.name_prefix.clone());

        let (by_id_a, counts_a) = index_by_identity(set_a, &normalizer);
        let (by_id_b, counts_b) = index_by_identity(set_b, &normalizer);

        let mut diff = ResourcesDiff::default();

        let duplicated: BTreeMap<&Identity, (usize, usize)> = by_id_a
            .keys()
            .chain(by_id_b.keys())
            .map(|identity| {
                let in_a = counts_a.get(identity).copied().unwrap_or(0);
                let in_b = counts_b.get(identity).copied().unwrap_or(0);
                (identity, (in_a, in_b))
            })
            .filter(|(_, (in_a, in_b))| *in_a > 1 || *in_b > 1)
            .collect();

        for (identity, (in_a, in_b)) in &duplicated {
            let side = match (*in_a > 1, *in_b > 1) {
                (true, true) => "A and B",
                (true, false) => "A",
                _ => "B",
            };
            let err = DiffError::DuplicateIdentity {
                identity: identity.to_string(),
                side: side.to_string(),
                count: (*in_a).max(*in_b),
            };
            tracing::warn!(identity = %identity, err.code = err.code(), "duplicate identity");
            diff.errors.insert((*identity).clone(), err);
        }

        for (identity, doc_a) in &by_id_a {
            if duplicated.contains_key(identity) {
                continue;
            }
            let Some(doc_b) = by_id_b.get(identity) else {
                diff.removed.push((*doc_a).clone());
                continue;
            };

            let _scope = tracing::debug_span!("compare_resource", identity = %identity).entered();
            match compare_trees(doc_a.tree(), doc_b.tree(), &self.config.compare) {
                Ok(result) if result.is_empty() => diff.unchanged.push((*doc_a).clone()),
                Ok(result) => {
                    tracing::debug!(record_count = result.len(), "resource changed");
                    diff.changed.insert(identity.clone(), result);
                }
                Err(err) => {
                    tracing::warn!(err.code = err.code(), error = %err, "resource not comparable");
                    diff.errors.insert(identity.clone(), err);
                }
            }
        }

        for (identity, doc_b) in &by_id_b {
            if !duplicated.contains_key(identity) && !by_id_a.contains_key(identity) {
                diff.added.push((*doc_b).clone());
            }
        }

        tracing::info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            unchanged = diff.unchanged.len(),
            errored = diff.errors.len(),
            "reconciled resource sets"
        );
        span.finish_with_records(diff.changed.values().map(DiffResult::len).sum());
        diff
    }

    /// Diff two bundles: resources are reconciled, values compared
    ///
    /// # Errors
    ///
    /// Returns `DiffError::MalformedTree` if either value tree cannot be
    /// compared. Resource-level failures are reported inside the result.
    pub fn diff_bundles(&self, a: &mut Bundle, b: &mut Bundle) -> Result<BundleDiff> {
        let span = OpSpan::enter(OP_DIFF_BUNDLES, self.context.as_ref());
        let resources = self.reconcile(&mut a.resources, &mut b.resources);
        let values = match self.diff_values(&a.values, &b.values) {
            Ok(values) => values,
            Err(err) => {
                span.fail(&err);
                return Err(err);
            }
        };
        let records = values.len() + resources.changed.values().map(DiffResult::len).sum::<usize>();
        span.finish_with_records(records);
        Ok(BundleDiff { resources, values })
    }
}

/// Normalize every document and index it by identity
///
/// The index keeps the first document seen per identity; the counts reveal
/// identities that occurred more than once.
fn index_by_identity<'d>(
    docs: &'d mut [ResourceDocument],
    normalizer: &IdentityNormalizer,
) -> (
    BTreeMap<Identity, &'d ResourceDocument>,
    BTreeMap<Identity, usize>,
) {
    let mut counts: BTreeMap<Identity, usize> = BTreeMap::new();
    for doc in docs.iter_mut() {
        *counts.entry(normalizer.normalize(doc)).or_insert(0) += 1;
    }

    let docs: &'d [ResourceDocument] = docs;
    let mut index = BTreeMap::new();
    for doc in docs {
        index.entry(doc.identity()).or_insert(doc);
    }
    (index, counts)
}
