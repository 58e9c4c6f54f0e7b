//! Canonical schema constants for structured logging
//!
//! Every event emitted by the engine uses these keys so that log pipelines
//! and the test capture layer can match on them.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_LABEL: &str = "label";

// Comparison subjects
pub const FIELD_IDENTITY: &str = "identity";
pub const FIELD_PATH: &str = "path";

// Result sizes
pub const FIELD_RECORD_COUNT: &str = "record_count";
pub const FIELD_ADDED: &str = "added";
pub const FIELD_REMOVED: &str = "removed";
pub const FIELD_CHANGED: &str = "changed";
pub const FIELD_UNCHANGED: &str = "unchanged";
pub const FIELD_ERRORED: &str = "errored";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Operation names
pub const OP_COMPARE: &str = "compare";
pub const OP_RECONCILE: &str = "reconcile";
pub const OP_DIFF_VALUES: &str = "diff_values";
pub const OP_DIFF_BUNDLES: &str = "diff_bundles";
pub const OP_DECODE_MANIFEST: &str = "decode_manifest";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        let ops = [
            OP_COMPARE,
            OP_RECONCILE,
            OP_DIFF_VALUES,
            OP_DIFF_BUNDLES,
            OP_DECODE_MANIFEST,
        ];
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
