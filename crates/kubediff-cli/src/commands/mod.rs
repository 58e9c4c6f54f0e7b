//! Subcommands and the helpers they share

pub mod bundle;
pub mod options;
pub mod resources;
pub mod values;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_yaml::Value;

use kubediff_core::diff::report::format_json;
use kubediff_core::manifest::{documents_from_manifest, values_from_str};
use kubediff_core::ResourceDocument;

/// Read and decode a rendered manifest file
pub fn load_manifest(path: &Path) -> Result<Vec<ResourceDocument>> {
    let text = read(path)?;
    documents_from_manifest(&text).with_context(|| format!("in manifest {}", path.display()))
}

/// Read and decode a values file
pub fn load_values(path: &Path) -> Result<Value> {
    let text = read(path)?;
    values_from_str(&text).with_context(|| format!("in values file {}", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", format_json(value)?);
    Ok(())
}
