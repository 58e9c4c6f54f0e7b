//! Options shared by every subcommand
//!
//! Resolution order: built-in defaults, then the `--config` file, then flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use kubediff_core::kubediff_core_types::RequestContext;
use kubediff_core::logging_facility::Profile;
use kubediff_core::{DiffConfig, DiffEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON document on stdout
    Json,
}

#[derive(Debug, Args)]
pub struct OptionArgs {
    /// TOML options file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Do not report order-only list changes
    #[arg(long, global = true)]
    pub ignore_order: bool,

    /// Treat strings differing only in whitespace as equal
    #[arg(long, global = true)]
    pub ignore_whitespace: bool,

    /// Report moved-and-edited list elements as removal plus addition
    #[arg(long, global = true)]
    pub no_renames: bool,

    /// Do not match list elements by name, key or id
    #[arg(long, global = true)]
    pub no_entity_detection: bool,

    /// Prefix stripped from resource names before matching
    #[arg(long, global = true)]
    pub name_prefix: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Emit logs on stderr (development or production)
    #[arg(long, global = true)]
    pub log_profile: Option<Profile>,

    /// Label attached to every log event of this run
    #[arg(long, global = true)]
    pub label: Option<String>,
}

impl OptionArgs {
    /// Merge defaults, the options file and flags into one configuration
    pub fn resolve(&self) -> Result<DiffConfig> {
        let mut config = match &self.config {
            Some(path) => DiffConfig::load(path)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => DiffConfig::default(),
        };

        if self.ignore_order {
            config.compare.ignore_order_changes = true;
        }
        if self.ignore_whitespace {
            config.compare.ignore_whitespace_changes = true;
        }
        if self.no_renames {
            config.compare.detect_renames = false;
        }
        if self.no_entity_detection {
            config.compare.domain_entity_detection = false;
        }
        if let Some(prefix) = &self.name_prefix {
            config.name_prefix = prefix.clone();
        }

        Ok(config)
    }

    /// Engine for this run, tagged with a fresh request context
    pub fn engine(&self) -> Result<DiffEngine> {
        let mut ctx = RequestContext::new();
        if let Some(label) = &self.label {
            ctx = ctx.with_label(label.clone());
        }
        Ok(DiffEngine::new(self.resolve()?).with_context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> OptionArgs {
        OptionArgs {
            config: None,
            ignore_order: false,
            ignore_whitespace: false,
            no_renames: false,
            no_entity_detection: false,
            name_prefix: None,
            format: OutputFormat::Text,
            log_profile: None,
            label: None,
        }
    }

    #[test]
    fn test_no_flags_yield_defaults() {
        assert_eq!(args().resolve().unwrap(), DiffConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubediff.toml");
        fs::write(
            &path,
            "name_prefix = \"kubediff-\"\n\n[compare]\ndetect_renames = true\n",
        )
        .unwrap();

        let options = OptionArgs {
            config: Some(path),
            no_renames: true,
            ignore_order: true,
            ..args()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.name_prefix, "kubediff-");
        assert!(!config.compare.detect_renames);
        assert!(config.compare.ignore_order_changes);
        assert!(config.compare.domain_entity_detection);
    }

    #[test]
    fn test_name_prefix_flag_wins() {
        let options = OptionArgs {
            name_prefix: Some(String::new()),
            ..args()
        };
        assert_eq!(options.resolve().unwrap().name_prefix, "");
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let options = OptionArgs {
            config: Some(PathBuf::from("/nonexistent/kubediff.toml")),
            ..args()
        };
        let err = options.resolve().unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load options"));
    }

    #[test]
    fn test_engine_carries_label() {
        let options = OptionArgs {
            label: Some("nightly".to_string()),
            ..args()
        };
        let engine = options.engine().unwrap();
        assert_eq!(
            engine.context().and_then(|c| c.label.as_deref()),
            Some("nightly")
        );
    }
}
