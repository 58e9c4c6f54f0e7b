use kubediff_core::ResourceDocument;
use serde_yaml::Value;

/// Parse a YAML snippet into a tree
#[allow(dead_code)]
pub fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).expect("test YAML should parse")
}

/// Build a resource document from YAML text
#[allow(dead_code)]
pub fn resource(text: &str) -> ResourceDocument {
    ResourceDocument::from_tree(yaml(text))
}

/// A ClusterRole granting `verbs` on pods
#[allow(dead_code)]
pub fn cluster_role(name: &str, verbs: &[&str]) -> ResourceDocument {
    resource(&format!(
        "apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: {name}
rules:
  - apiGroups: ['']
    resources: [pods]
    verbs: [{verbs}]
",
        name = name,
        verbs = verbs.join(", ")
    ))
}

/// A core-group ConfigMap with a single data entry
#[allow(dead_code)]
pub fn config_map(name: &str, key: &str, value: &str) -> ResourceDocument {
    resource(&format!(
        "apiVersion: v1
kind: ConfigMap
metadata:
  name: {name}
data:
  {key}: '{value}'
",
        name = name,
        key = key,
        value = value
    ))
}

/// Recursively reverse the key insertion order of every mapping
#[allow(dead_code)]
pub fn reverse_key_order(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let entries: Vec<(Value, Value)> = map
                .iter()
                .map(|(k, v)| (k.clone(), reverse_key_order(v)))
                .collect();
            Value::Mapping(entries.into_iter().rev().collect())
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(reverse_key_order).collect()),
        other => other.clone(),
    }
}
