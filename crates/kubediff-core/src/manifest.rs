//! Decoding of rendered manifest streams and value documents
//!
//! A rendered manifest is a YAML stream of zero or more documents separated
//! by `---`. Empty documents (a bare separator, comments only) are skipped.
//! `v1/List` documents are flattened into their `items`.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use kubediff_core_types::schema::OP_DECODE_MANIFEST;

use crate::errors::{DiffError, Result};
use crate::logging_facility::OpSpan;
use crate::resource::ResourceDocument;
use crate::tree;

/// Decode every resource document in a manifest stream
///
/// # Errors
///
/// Returns `DiffError::ManifestDecode` naming the zero-based index of the
/// first document that is not valid YAML or is not a mapping.
pub fn documents_from_manifest(text: &str) -> Result<Vec<ResourceDocument>> {
    let span = OpSpan::enter(OP_DECODE_MANIFEST, None);
    match decode_stream(text) {
        Ok(docs) => {
            span.finish_with_records(docs.len());
            Ok(docs)
        }
        Err(err) => {
            span.fail(&err);
            Err(err)
        }
    }
}

fn decode_stream(text: &str) -> Result<Vec<ResourceDocument>> {
    let mut docs = Vec::new();
    if is_blank(text) {
        return Ok(docs);
    }
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document).map_err(|e| DiffError::ManifestDecode {
            index,
            reason: e.to_string(),
        })?;
        match value {
            Value::Null => {
                tracing::debug!(index, "skipping empty document");
            }
            Value::Mapping(map) if is_list(&map) => {
                for item in list_items(&map, index)? {
                    docs.push(ResourceDocument::from_tree(item));
                }
            }
            Value::Mapping(map) => {
                let doc = ResourceDocument::from_tree(Value::Mapping(map));
                tracing::debug!(identity = %doc.identity(), "identified resource");
                docs.push(doc);
            }
            other => {
                return Err(DiffError::ManifestDecode {
                    index,
                    reason: format!("expected a mapping, found {}", tree::type_name(&other)),
                })
            }
        }
    }
    Ok(docs)
}

/// Only whitespace, comments and document separators
fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn is_list(map: &Mapping) -> bool {
    map.get("apiVersion").and_then(Value::as_str) == Some("v1")
        && map.get("kind").and_then(Value::as_str) == Some("List")
}

fn list_items(map: &Mapping, index: usize) -> Result<Vec<Value>> {
    let items = match map.get("items") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(other) => {
            return Err(DiffError::ManifestDecode {
                index,
                reason: format!("List items must be a list, found {}", tree::type_name(other)),
            })
        }
    };
    items
        .iter()
        .map(|item| match item {
            Value::Mapping(_) => Ok(item.clone()),
            other => Err(DiffError::ManifestDecode {
                index,
                reason: format!("List item is not a mapping, found {}", tree::type_name(other)),
            }),
        })
        .collect()
}

/// Decode a configuration-value document
///
/// An empty document decodes to an empty map.
///
/// # Errors
///
/// Returns `DiffError::ValuesDecode` if the text is not valid YAML or its
/// root is neither a map nor empty.
pub fn values_from_str(text: &str) -> Result<Value> {
    if is_blank(text) {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let value: Value = serde_yaml::from_str(text).map_err(|e| DiffError::ValuesDecode {
        reason: e.to_string(),
    })?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        other => Err(DiffError::ValuesDecode {
            reason: format!("expected a mapping at the root, found {}", tree::type_name(&other)),
        }),
    }
}
