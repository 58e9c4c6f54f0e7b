//! Text report renderer for diff results.
//!
//! Each record renders as a block:
//!
//! ```text
//! @@ global.rbac @@
//! ! + one map entry added:
//! +   disableHTTPChallengesRole: false
//! ```
//!
//! Blocks are separated by a blank line. The output is a pure function of the
//! result, so it can be stored as a golden file.

use serde::Serialize;
use serde_yaml::Value;

use crate::diff::model::{BundleDiff, DiffKind, DiffResult, DifferenceRecord, ResourcesDiff};
use crate::errors::Result;
use crate::tree;

/// Render every record of `result`; empty results render as an empty string
pub fn format_result(result: &DiffResult) -> String {
    result
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// Render a single record block
pub fn format_record(record: &DifferenceRecord) -> String {
    let mut lines = vec![format!("@@ {} @@", record.path)];

    match record.kind {
        DiffKind::Addition => {
            lines.push(format!("! + {} added:", entry_phrase(record.after.as_ref())));
            push_fragment(&mut lines, "+", record.after.as_ref());
        }
        DiffKind::Removal => {
            lines.push(format!("! - {} removed:", entry_phrase(record.before.as_ref())));
            push_fragment(&mut lines, "-", record.before.as_ref());
        }
        DiffKind::ValueChange => {
            lines.push("! ± value change".to_string());
            push_fragment(&mut lines, "-", record.before.as_ref());
            push_fragment(&mut lines, "+", record.after.as_ref());
        }
        DiffKind::TypeChange => {
            lines.push(format!(
                "! ± type change from {} to {}",
                record.before.as_ref().map_or("null", tree::type_name),
                record.after.as_ref().map_or("null", tree::type_name),
            ));
            push_fragment(&mut lines, "-", record.before.as_ref());
            push_fragment(&mut lines, "+", record.after.as_ref());
        }
        DiffKind::OrderChange => {
            lines.push("! ⇆ order changed".to_string());
            if let Some(before) = &record.before {
                lines.push(format!("- {}", tree::compact(before)));
            }
            if let Some(after) = &record.after {
                lines.push(format!("+ {}", tree::compact(after)));
            }
        }
        DiffKind::Rename => {
            lines.push("! ⇆ list entry renamed or moved".to_string());
            push_fragment(&mut lines, "-", record.before.as_ref());
            push_fragment(&mut lines, "+", record.after.as_ref());
        }
    }

    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a resource-set reconciliation
///
/// Sections appear in a fixed order (added, removed, changed, errors) and are
/// omitted when empty; the unchanged bucket is reported as a count.
pub fn format_resources(diff: &ResourcesDiff) -> String {
    let mut sections = Vec::new();

    if !diff.added.is_empty() {
        let mut section = format!("Added ({}):", diff.added.len());
        for doc in &diff.added {
            section.push_str(&format!("\n+ {}", doc.identity()));
        }
        sections.push(section);
    }

    if !diff.removed.is_empty() {
        let mut section = format!("Removed ({}):", diff.removed.len());
        for doc in &diff.removed {
            section.push_str(&format!("\n- {}", doc.identity()));
        }
        sections.push(section);
    }

    if !diff.changed.is_empty() {
        let mut section = format!("Changed ({}):", diff.changed.len());
        for (identity, result) in &diff.changed {
            section.push_str(&format!("\n\n### {}\n\n{}", identity, format_result(result)));
        }
        sections.push(section);
    }

    if !diff.errors.is_empty() {
        let mut section = format!("Errors ({}):", diff.errors.len());
        for (identity, err) in &diff.errors {
            section.push_str(&format!("\n! {}: [{}] {}", identity, err.code(), err));
        }
        sections.push(section);
    }

    sections.push(format!(
        "Unchanged: {}",
        count_phrase(diff.unchanged.len(), "resource", "resources")
    ));

    sections.join("\n\n")
}

/// Render a bundle diff: resources first, then values
pub fn format_bundle(diff: &BundleDiff) -> String {
    let values = if diff.values.is_empty() {
        "No value changes.".to_string()
    } else {
        format_result(&diff.values)
    };
    format!(
        "## Resources\n\n{}\n\n## Values\n\n{}",
        format_resources(&diff.resources),
        values
    )
}

/// Render any report value as pretty-printed JSON
///
/// # Errors
///
/// Returns `DiffError::Serialization` if `value` cannot be represented as JSON.
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn entry_phrase(fragment: Option<&Value>) -> String {
    match fragment {
        Some(Value::Mapping(map)) => count_phrase(map.len(), "map entry", "map entries"),
        Some(Value::Sequence(items)) => count_phrase(items.len(), "list entry", "list entries"),
        _ => "one value".to_string(),
    }
}

fn count_phrase(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{} {}", number_word(count), noun)
}

/// Spell small counts as words
fn number_word(n: usize) -> String {
    const WORDS: [&str; 13] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve",
    ];
    WORDS
        .get(n)
        .map_or_else(|| n.to_string(), |word| (*word).to_string())
}

/// Append the marked lines of a fragment
///
/// Maps are rendered as YAML indented past the marker, lists as YAML
/// sequences, scalars as plain text.
fn push_fragment(lines: &mut Vec<String>, marker: &str, fragment: Option<&Value>) {
    let Some(value) = fragment else {
        return;
    };
    let (indent, body) = match value {
        Value::Mapping(_) => ("   ", yaml_text(value)),
        Value::Sequence(_) => (" ", yaml_text(value)),
        other => (" ", tree::scalar_text(other)),
    };
    for line in body.lines() {
        lines.push(format!("{}{}{}", marker, indent, line));
    }
}

fn yaml_text(value: &Value) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|_| tree::compact(value))
}
