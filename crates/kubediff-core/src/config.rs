//! Comparison options and their TOML representation
//!
//! Options resolve in three layers: built-in defaults, then an optional
//! options file, then explicit overrides from the caller (CLI flags).
//!
//! ```toml
//! name_prefix = "kubediff-"
//!
//! [compare]
//! ignore_order_changes = true
//! detect_renames = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{DiffError, Result};
use crate::identity::DEFAULT_NAME_PREFIX;

/// Switches controlling the tree comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareOptions {
    /// Suppress order-only differences in lists
    pub ignore_order_changes: bool,
    /// Treat strings that differ only in whitespace runs as equal
    pub ignore_whitespace_changes: bool,
    /// Pair similar unmatched list elements into rename records
    pub detect_renames: bool,
    /// Match list elements by identifying fields such as `name`
    pub domain_entity_detection: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_order_changes: false,
            ignore_whitespace_changes: false,
            detect_renames: true,
            domain_entity_detection: true,
        }
    }
}

/// Full engine configuration: comparator switches plus identity normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Prefix stripped from resource names before identities are computed
    pub name_prefix: String,
    pub compare: CompareOptions,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            compare: CompareOptions::default(),
        }
    }
}

impl DiffConfig {
    /// Parse a configuration from TOML text
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::InvalidConfig` if the text is not valid TOML or
    /// names a key this configuration does not know.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DiffConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Load a configuration file from disk
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Io` if the file cannot be read and
    /// `DiffError::InvalidConfig` if its contents do not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| DiffError::Io {
            operation: format!("read config {}", path.display()),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn with_compare(mut self, compare: CompareOptions) -> Self {
        self.compare = compare;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompareOptions::default();
        assert!(!options.ignore_order_changes);
        assert!(!options.ignore_whitespace_changes);
        assert!(options.detect_renames);
        assert!(options.domain_entity_detection);
        assert_eq!(DiffConfig::default().name_prefix, "kube-inspect-");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = DiffConfig::from_toml_str("").unwrap();
        assert_eq!(config, DiffConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_keys() {
        let config = DiffConfig::from_toml_str(
            r#"
name_prefix = "kubediff-"

[compare]
ignore_order_changes = true
"#,
        )
        .unwrap();
        assert_eq!(config.name_prefix, "kubediff-");
        assert!(config.compare.ignore_order_changes);
        assert!(config.compare.detect_renames);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DiffConfig::from_toml_str("[compare]\nignore_everything = true\n").unwrap_err();
        assert!(matches!(err, DiffError::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = DiffConfig::load("/nonexistent/kubediff.toml").unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }));
    }
}
