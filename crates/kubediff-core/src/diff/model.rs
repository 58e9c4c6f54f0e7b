//! Diff output types.
//!
//! Collections use `BTreeMap` and sorted `Vec` so that iteration, rendering
//! and serialization are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use sha2::{Digest, Sha256};

use crate::errors::DiffError;
use crate::identity::Identity;
use crate::resource::ResourceDocument;
use crate::tree;

/// One step of a path into a tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathElement {
    /// Map key
    Key(String),
    /// List position
    Index(usize),
    /// List element addressed by an identifying field, e.g. `name: web`
    Entry { field: String, value: String },
}

/// True when a key or entry value would read ambiguously if rendered bare
fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.bytes().all(|b| b.is_ascii_digit())
        || text.contains(['.', '[', ']', '"', '\\', '='])
}

fn write_segment(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if !needs_quotes(text) {
        return f.write_str(text);
    }
    f.write_str("\"")?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

/// Keys render bare unless they contain separators or look like an index,
/// entries render as `[field=value]`
impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Key(key) => write_segment(f, key),
            PathElement::Index(index) => write!(f, "{}", index),
            PathElement::Entry { field, value } => {
                write!(f, "[{}=", field)?;
                write_segment(f, value)?;
                f.write_str("]")
            }
        }
    }
}

/// Location of a difference, from the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathElement>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// A new path one step below this one
    pub fn child(&self, element: PathElement) -> Self {
        let mut elements = self.0.clone();
        elements.push(element);
        Self(elements)
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root level)");
        }
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 && !matches!(element, PathElement::Entry { .. }) {
                f.write_str(".")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

/// Kind of a single difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Addition,
    Removal,
    ValueChange,
    TypeChange,
    OrderChange,
    Rename,
}

/// One path-addressed difference between two trees
///
/// `before` is absent for additions and `after` is absent for removals.
/// Grouped additions and removals carry a map or list fragment holding every
/// entry added or removed at `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    pub path: Path,
    pub kind: DiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

impl DifferenceRecord {
    pub fn addition(path: Path, fragment: Value) -> Self {
        Self {
            path,
            kind: DiffKind::Addition,
            before: None,
            after: Some(tree::canonical(&fragment)),
        }
    }

    pub fn removal(path: Path, fragment: Value) -> Self {
        Self {
            path,
            kind: DiffKind::Removal,
            before: Some(tree::canonical(&fragment)),
            after: None,
        }
    }

    /// Record with both sides present
    pub fn change(path: Path, kind: DiffKind, before: Value, after: Value) -> Self {
        Self {
            path,
            kind,
            before: Some(tree::canonical(&before)),
            after: Some(tree::canonical(&after)),
        }
    }
}

/// Ordered list of difference records; empty means the trees are equal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffResult {
    records: Vec<DifferenceRecord>,
}

impl DiffResult {
    pub fn new(records: Vec<DifferenceRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[DifferenceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DifferenceRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<DifferenceRecord> {
        self.records
    }

    /// Number of records of the given kind
    pub fn count_of(&self, kind: DiffKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// SHA256 of the text report, hex encoded
    ///
    /// Two results with the same fingerprint render identically, which makes
    /// the fingerprint usable for diff-of-diffs and snapshot comparisons.
    pub fn fingerprint(&self) -> String {
        let rendered = crate::diff::report::format_result(self);
        hex::encode(Sha256::digest(rendered.as_bytes()))
    }
}

impl<'a> IntoIterator for &'a DiffResult {
    type Item = &'a DifferenceRecord;
    type IntoIter = std::slice::Iter<'a, DifferenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Bucket a resource identity landed in after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Added,
    Removed,
    Changed,
    Unchanged,
    Errored,
}

/// Reconciliation of two resource sets
///
/// Every identity present in either set appears in exactly one bucket.
/// Document buckets are sorted by identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcesDiff {
    /// Present only in B
    pub added: Vec<ResourceDocument>,
    /// Present only in A
    pub removed: Vec<ResourceDocument>,
    /// Present in both with a non-empty diff
    pub changed: BTreeMap<Identity, DiffResult>,
    /// Present in both and equal (A's document is kept)
    pub unchanged: Vec<ResourceDocument>,
    /// Identities that could not be compared
    pub errors: BTreeMap<Identity, DiffError>,
}

impl ResourcesDiff {
    /// True when nothing was added, removed, changed or errored
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.errors.is_empty()
    }

    /// Bucket holding `identity`, if either set contained it
    pub fn classification_of(&self, identity: &Identity) -> Option<Classification> {
        let holds = |docs: &[ResourceDocument]| docs.iter().any(|d| &d.identity() == identity);
        if self.changed.contains_key(identity) {
            Some(Classification::Changed)
        } else if self.errors.contains_key(identity) {
            Some(Classification::Errored)
        } else if holds(&self.added) {
            Some(Classification::Added)
        } else if holds(&self.removed) {
            Some(Classification::Removed)
        } else if holds(&self.unchanged) {
            Some(Classification::Unchanged)
        } else {
            None
        }
    }

    pub fn summary(&self) -> ResourcesSummary {
        let identities = |docs: &[ResourceDocument]| -> Vec<String> {
            docs.iter().map(|d| d.identity().to_string()).collect()
        };
        ResourcesSummary {
            added: identities(&self.added),
            removed: identities(&self.removed),
            changed: self
                .changed
                .iter()
                .map(|(identity, result)| ChangedSummary {
                    identity: identity.to_string(),
                    record_count: result.len(),
                    fingerprint: result.fingerprint(),
                })
                .collect(),
            unchanged: identities(&self.unchanged),
            errors: self
                .errors
                .iter()
                .map(|(identity, err)| ErrorSummary {
                    identity: identity.to_string(),
                    code: err.code().to_string(),
                    message: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable digest of a [`ResourcesDiff`], used for JSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<ChangedSummary>,
    pub unchanged: Vec<String>,
    pub errors: Vec<ErrorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedSummary {
    pub identity: String,
    pub record_count: usize,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub identity: String,
    pub code: String,
    pub message: String,
}

/// Rendered resources plus the value tree they were rendered from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub resources: Vec<ResourceDocument>,
    pub values: Value,
}

impl Bundle {
    pub fn new(resources: Vec<ResourceDocument>, values: Value) -> Self {
        Self { resources, values }
    }
}

/// Resource and value differences between two bundles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleDiff {
    pub resources: ResourcesDiff,
    pub values: DiffResult,
}

impl BundleDiff {
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.values.is_empty()
    }
}
