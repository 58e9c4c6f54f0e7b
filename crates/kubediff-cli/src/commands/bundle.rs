//! Bundle command
//!
//! Usage: kubediff bundle --manifest-a <FILE> --manifest-b <FILE>
//! [--values-a <FILE>] [--values-b <FILE>]

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use kubediff_core::diff::report::format_bundle;
use kubediff_core::diff::ResourcesSummary;
use kubediff_core::{Bundle, DiffResult};

use super::options::{OptionArgs, OutputFormat};
use super::{load_manifest, load_values, print_json};

#[derive(Debug, Args)]
pub struct BundleArgs {
    /// Rendered manifest of the old side
    #[arg(long)]
    pub manifest_a: PathBuf,

    /// Rendered manifest of the new side
    #[arg(long)]
    pub manifest_b: PathBuf,

    /// Values the old side was rendered from (default: empty)
    #[arg(long)]
    pub values_a: Option<PathBuf>,

    /// Values the new side was rendered from (default: empty)
    #[arg(long)]
    pub values_b: Option<PathBuf>,
}

#[derive(Serialize)]
struct BundleReport<'a> {
    resources: ResourcesSummary,
    values: &'a DiffResult,
}

/// Execute bundle command
pub fn execute(args: BundleArgs, options: &OptionArgs) -> Result<()> {
    let engine = options.engine()?;

    let mut bundle_a = load_bundle(&args.manifest_a, args.values_a.as_deref())?;
    let mut bundle_b = load_bundle(&args.manifest_b, args.values_b.as_deref())?;
    let diff = engine.diff_bundles(&mut bundle_a, &mut bundle_b)?;

    match options.format {
        OutputFormat::Text => println!("{}", format_bundle(&diff)),
        OutputFormat::Json => print_json(&BundleReport {
            resources: diff.resources.summary(),
            values: &diff.values,
        })?,
    }
    Ok(())
}

fn load_bundle(manifest: &Path, values: Option<&Path>) -> Result<Bundle> {
    let resources = load_manifest(manifest)?;
    let values = match values {
        Some(path) => load_values(path)?,
        None => Value::Mapping(Mapping::new()),
    };
    Ok(Bundle::new(resources, values))
}
