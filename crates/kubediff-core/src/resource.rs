//! Rendered resource documents and filters over them

use serde::Serialize;
use serde_yaml::Value;

use crate::identity::Identity;

/// One decoded Kubernetes resource plus the fields used to identify it
///
/// The identifying fields are extracted once from the tree by
/// [`ResourceDocument::from_tree`]; [`ResourceDocument::set_name`] keeps the
/// extracted name and `metadata.name` in step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDocument {
    tree: Value,
    api_group: String,
    api_version: String,
    kind: String,
    name: String,
    namespace: Option<String>,
}

impl ResourceDocument {
    /// Build a document from a decoded tree
    ///
    /// `apiVersion` is split on its last `/` into group and version; a value
    /// without a `/` belongs to the core group. Missing fields become empty.
    pub fn from_tree(tree: Value) -> Self {
        let text = |node: Option<&Value>| node.and_then(Value::as_str).map(str::to_string);
        let metadata = tree.get("metadata");

        let api_version_field = text(tree.get("apiVersion")).unwrap_or_default();
        let (api_group, api_version) = match api_version_field.rsplit_once('/') {
            Some((group, version)) => (group.to_string(), version.to_string()),
            None => (String::new(), api_version_field),
        };

        Self {
            api_group,
            api_version,
            kind: text(tree.get("kind")).unwrap_or_default(),
            name: text(metadata.and_then(|m| m.get("name"))).unwrap_or_default(),
            namespace: text(metadata.and_then(|m| m.get("namespace"))),
            tree,
        }
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }

    pub fn api_group(&self) -> &str {
        &self.api_group
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Rename the document, updating `metadata.name` when the tree has one
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if let Some(metadata) = self
            .tree
            .get_mut("metadata")
            .and_then(Value::as_mapping_mut)
        {
            metadata.insert(Value::String("name".to_string()), Value::String(name.clone()));
        }
        self.name = name;
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.api_group.clone(),
            self.api_version.clone(),
            self.kind.clone(),
            self.name.clone(),
        )
    }
}

/// Predicate selecting resources
pub type ResourceFilter = Box<dyn Fn(&ResourceDocument) -> bool + Send + Sync>;

/// Select resources whose `metadata.name` equals `name`
pub fn with_name(name: impl Into<String>) -> ResourceFilter {
    let name = name.into();
    Box::new(move |doc: &ResourceDocument| doc.name() == name)
}

/// Select resources whose `kind` equals `kind`
pub fn with_kind(kind: impl Into<String>) -> ResourceFilter {
    let kind = kind.into();
    Box::new(move |doc: &ResourceDocument| doc.kind() == kind)
}

/// Select resources in `namespace`
pub fn with_namespace(namespace: impl Into<String>) -> ResourceFilter {
    let namespace = namespace.into();
    Box::new(move |doc: &ResourceDocument| doc.namespace() == Some(namespace.as_str()))
}

/// Documents matching every filter, in input order
///
/// An empty filter list selects everything.
pub fn filter_resources<'a>(
    docs: &'a [ResourceDocument],
    filters: &[ResourceFilter],
) -> Vec<&'a ResourceDocument> {
    docs.iter()
        .filter(|doc| filters.iter().all(|f| f(*doc)))
        .collect()
}

/// Owned variant of [`filter_resources`]
pub fn retain_resources(docs: &mut Vec<ResourceDocument>, filters: &[ResourceFilter]) {
    docs.retain(|doc| filters.iter().all(|f| f(doc)));
}
