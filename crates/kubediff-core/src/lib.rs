//! kubediff Core - reconciliation and structural diff engine
//!
//! This crate compares two rendered sets of Kubernetes resources (and the
//! configuration-value trees they were rendered from) and produces a
//! deterministic, path-addressed description of what changed:
//! - Identity normalization for resources rendered under a synthetic name prefix
//! - A general-purpose tree comparator over `serde_yaml::Value` trees
//! - Resource-set reconciliation into added / removed / changed / unchanged
//! - Value-tree and whole-bundle diffs
//! - A stable text report suitable for golden-file tests
//!
//! Decoding of rendered manifests is provided as a thin boundary adapter in
//! [`manifest`]; rendering and registry access live outside this crate.

pub mod config;
pub mod diff;
pub mod errors;
pub mod identity;
pub mod logging_facility;
pub mod manifest;
pub mod resource;
pub mod tree;

pub use kubediff_core_types;

// Re-export commonly used types
pub use config::{CompareOptions, DiffConfig};
pub use diff::{
    compare, diff_bundles, diff_values, reconcile, Bundle, BundleDiff, DiffEngine, DiffKind,
    DiffResult, DifferenceRecord, Path, PathElement, ResourcesDiff,
};
pub use errors::{DiffError, ExError, ExErrorKind, Result};
pub use identity::{Identity, IdentityNormalizer};
pub use resource::ResourceDocument;
