//! Structural diff engine.
//!
//! Compares configuration trees and rendered resource sets and produces
//! deterministic, path-addressed difference records.
//!
//! ## Entry points
//!
//! ```
//! use kubediff_core::diff::{compare, report::format_result};
//! use kubediff_core::CompareOptions;
//!
//! let a = serde_yaml::from_str("replicas: 1").unwrap();
//! let b = serde_yaml::from_str("replicas: 2").unwrap();
//! let result = compare(&a, &b, &CompareOptions::default()).unwrap();
//! assert_eq!(format_result(&result), "@@ replicas @@\n! ± value change\n- 1\n+ 2");
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical records and text,
//!   whatever the key insertion order of the input mappings.
//! - **Reflexivity**: comparing a tree with itself yields no records.
//! - **Partition**: reconciliation places every identity in exactly one bucket.

pub mod compare;
pub mod engine;
pub mod model;
pub mod report;

pub use compare::{compare_trees, IDENTIFIER_FIELDS, RENAME_SIMILARITY_THRESHOLD};
pub use engine::DiffEngine;
pub use model::{
    Bundle, BundleDiff, Classification, DiffKind, DiffResult, DifferenceRecord, Path, PathElement,
    ResourcesDiff, ResourcesSummary,
};
pub use report::{format_bundle, format_json, format_resources, format_result};

use serde_yaml::Value;

use crate::config::{CompareOptions, DiffConfig};
use crate::errors::Result;
use crate::resource::ResourceDocument;

/// Compare two trees with the given options
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` if either tree cannot be compared.
pub fn compare(a: &Value, b: &Value, options: &CompareOptions) -> Result<DiffResult> {
    DiffEngine::new(DiffConfig::default().with_compare(*options)).compare(a, b)
}

/// Reconcile two resource sets, normalizing names in place
pub fn reconcile(
    set_a: &mut [ResourceDocument],
    set_b: &mut [ResourceDocument],
    config: &DiffConfig,
) -> ResourcesDiff {
    DiffEngine::new(config.clone()).reconcile(set_a, set_b)
}

/// Compare two configuration-value trees
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` if either tree cannot be compared.
pub fn diff_values(a: &Value, b: &Value, options: &CompareOptions) -> Result<DiffResult> {
    DiffEngine::new(DiffConfig::default().with_compare(*options)).diff_values(a, b)
}

/// Diff two bundles
///
/// # Errors
///
/// Returns `DiffError::MalformedTree` if either value tree cannot be compared.
pub fn diff_bundles(a: &mut Bundle, b: &mut Bundle, config: &DiffConfig) -> Result<BundleDiff> {
    DiffEngine::new(config.clone()).diff_bundles(a, b)
}
