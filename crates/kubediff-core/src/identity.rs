//! Resource identity and name normalization
//!
//! Resources are matched across two sets by `(group, version, kind, name)`.
//! When a renderer is invoked with a synthetic release name, rendered
//! resource names start with that name as a prefix; stripping it first lets
//! a resource be matched with its counterpart from another rendering.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::resource::ResourceDocument;

/// Name prefix stripped when no other prefix is configured
///
/// Matches the synthetic release name the chart renderer passes to
/// templates, so `{{ .Release.Name }}-foo` renders as `kube-inspect-foo`.
pub const DEFAULT_NAME_PREFIX: &str = "kube-inspect-";

/// Identity of a rendered resource
///
/// Ordering is lexicographic on `(group, version, kind, name)`. The core API
/// group is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
}

impl Identity {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// `Kind/name`, for places where the API version is noise
    pub fn short(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}/{}", self.version, self.kind, self.name)
        } else {
            write!(
                f,
                "{}/{}/{}/{}",
                self.group, self.version, self.kind, self.name
            )
        }
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Strips a configured prefix from resource names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityNormalizer {
    prefix: String,
}

impl IdentityNormalizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the prefix from `doc`'s name (in place) and return its identity
    ///
    /// Names without the prefix are left untouched. An empty prefix disables
    /// stripping.
    pub fn normalize(&self, doc: &mut ResourceDocument) -> Identity {
        if !self.prefix.is_empty() {
            if let Some(stripped) = doc.name().strip_prefix(self.prefix.as_str()) {
                let stripped = stripped.to_string();
                doc.set_name(stripped);
            }
        }
        doc.identity()
    }
}

impl Default for IdentityNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIX)
    }
}

/// Normalize with the default prefix
pub fn normalize(doc: &mut ResourceDocument) -> Identity {
    IdentityNormalizer::default().normalize(doc)
}
