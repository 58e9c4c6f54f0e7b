//! Values command
//!
//! Usage: kubediff values <A> <B>

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kubediff_core::diff::report::format_result;

use super::options::{OptionArgs, OutputFormat};
use super::{load_values, print_json};

#[derive(Debug, Args)]
pub struct ValuesArgs {
    /// Values file of the old side
    pub a: PathBuf,

    /// Values file of the new side
    pub b: PathBuf,
}

/// Execute values command
pub fn execute(args: ValuesArgs, options: &OptionArgs) -> Result<()> {
    let engine = options.engine()?;

    let values_a = load_values(&args.a)?;
    let values_b = load_values(&args.b)?;
    let result = engine.diff_values(&values_a, &values_b)?;

    match options.format {
        OutputFormat::Text if result.is_empty() => println!("No value changes."),
        OutputFormat::Text => println!("{}", format_result(&result)),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}
