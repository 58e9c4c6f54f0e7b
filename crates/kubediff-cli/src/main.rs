//! kubediff CLI
//!
//! Command-line interface for comparing rendered Kubernetes manifests and
//! the values they were rendered from

use clap::{Parser, Subcommand};
use kubediff_core::logging_facility;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "kubediff")]
#[command(about = "kubediff - Structural diff of rendered Kubernetes resources", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: commands::options::OptionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile the resources of two rendered manifests
    Resources(commands::resources::ResourcesArgs),
    /// Compare two values files
    Values(commands::values::ValuesArgs),
    /// Compare manifests and values together
    Bundle(commands::bundle::BundleArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.options.log_profile {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Resources(args) => commands::resources::execute(args, &cli.options),
        Commands::Values(args) => commands::values::execute(args, &cli.options),
        Commands::Bundle(args) => commands::bundle::execute(args, &cli.options),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
