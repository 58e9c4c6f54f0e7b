//! Resources command
//!
//! Usage: kubediff resources <A> <B> [--kind <KIND>] [--namespace <NS>]

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kubediff_core::diff::report::format_resources;
use kubediff_core::resource::{retain_resources, with_kind, with_namespace, ResourceFilter};

use super::options::{OptionArgs, OutputFormat};
use super::{load_manifest, print_json};

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    /// Rendered manifest of the old side
    pub a: PathBuf,

    /// Rendered manifest of the new side
    pub b: PathBuf,

    /// Only compare resources of this kind
    #[arg(long)]
    pub kind: Option<String>,

    /// Only compare resources in this namespace
    #[arg(long)]
    pub namespace: Option<String>,
}

impl ResourcesArgs {
    fn filters(&self) -> Vec<ResourceFilter> {
        let mut filters = Vec::new();
        if let Some(kind) = &self.kind {
            filters.push(with_kind(kind.clone()));
        }
        if let Some(namespace) = &self.namespace {
            filters.push(with_namespace(namespace.clone()));
        }
        filters
    }
}

/// Execute resources command
pub fn execute(args: ResourcesArgs, options: &OptionArgs) -> Result<()> {
    let engine = options.engine()?;

    let mut set_a = load_manifest(&args.a)?;
    let mut set_b = load_manifest(&args.b)?;
    let filters = args.filters();
    retain_resources(&mut set_a, &filters);
    retain_resources(&mut set_b, &filters);

    let diff = engine.reconcile(&mut set_a, &mut set_b);

    match options.format {
        OutputFormat::Text => println!("{}", format_resources(&diff)),
        OutputFormat::Json => print_json(&diff.summary())?,
    }
    Ok(())
}
