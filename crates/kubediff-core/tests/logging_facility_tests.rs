#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{cluster_role, yaml};
use kubediff_core::errors::{DiffError, ExError, ExErrorKind};
use kubediff_core::kubediff_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, OP_COMPARE, OP_DIFF_VALUES, OP_RECONCILE,
};
use kubediff_core::kubediff_core_types::{RequestContext, RequestId};
use kubediff_core::logging_facility::test_capture::init_test_capture;
use kubediff_core::logging_facility::OpSpan;
use kubediff_core::{log_op_end, log_op_error, log_op_start, DiffConfig, DiffEngine};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.events_for(op_name, EVENT_START);
    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events = capture.events_for(op_name, EVENT_END);
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = DiffError::MalformedTree {
        path: "data".to_string(),
        reason: "mapping key of type list is not a scalar".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events = capture.events_for(op_name, EVENT_END_ERROR);
    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err.code"), Some("ERR_MALFORMED_TREE"));
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, identity = "v1/ConfigMap/cm", record_count = 3);

    let start_event = capture
        .events_for(op_name, EVENT_START)
        .into_iter()
        .next()
        .expect("Should have start event");
    assert_eq!(start_event.field("identity"), Some("v1/ConfigMap/cm"));
    assert_eq!(start_event.field("record_count"), Some("3"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_op_span_logs_one_start_and_one_end() {
    let capture = init_test_capture();
    let op_name = "test_op_span_boundary_unique_5";

    let span = OpSpan::enter(op_name, None);
    span.finish_with_records(7);

    assert_eq!(capture.events_for(op_name, EVENT_START).len(), 1);
    let ends = capture.events_for(op_name, EVENT_END);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("record_count"), Some("7"));
    assert!(capture.events_for(op_name, EVENT_END_ERROR).is_empty());
}

#[test]
fn test_op_span_drop_logs_end() {
    let capture = init_test_capture();
    let op_name = "test_op_span_drop_unique_6";

    {
        let _span = OpSpan::enter(op_name, None);
    }

    assert_eq!(capture.events_for(op_name, EVENT_END).len(), 1);
}

#[test]
fn test_op_span_fail_logs_end_error_only() {
    let capture = init_test_capture();
    let op_name = "test_op_span_fail_unique_7";

    let span = OpSpan::enter(op_name, None);
    span.fail(&DiffError::ValuesDecode {
        reason: "expected a mapping at the root, found list".to_string(),
    });

    let errors = capture.events_for(op_name, EVENT_END_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err.code"), Some("ERR_INVALID_VALUES"));
    assert!(capture.events_for(op_name, EVENT_END).is_empty());
}

#[test]
fn test_op_span_propagates_request_context() {
    let capture = init_test_capture();
    let op_name = "test_op_span_context_unique_8";
    let ctx = RequestContext::with_request_id(RequestId::from_string("ci-build-4411"))
        .with_label("cert-manager 1.17.1 -> 1.18.0");

    let span = OpSpan::enter(op_name, Some(&ctx));
    tracing::info!(op = op_name, event = "progress", "inside the operation");
    span.finish_with_records(0);

    for event in [EVENT_START, "progress", EVENT_END] {
        let events = capture.events_for(op_name, event);
        assert_eq!(events.len(), 1, "missing {} event", event);
        assert_eq!(events[0].field("request_id"), Some("ci-build-4411"));
        assert_eq!(
            events[0].field("label"),
            Some("cert-manager 1.17.1 -> 1.18.0")
        );
    }
}

#[test]
fn test_engine_compare_logs_boundary_with_label() {
    let capture = init_test_capture();
    let label = "engine-compare-unique-9";
    let engine = DiffEngine::new(DiffConfig::default())
        .with_context(RequestContext::new().with_label(label));

    let result = engine
        .compare(&yaml("replicas: 1"), &yaml("replicas: 2"))
        .unwrap();
    assert_eq!(result.len(), 1);

    let ends: Vec<_> = capture
        .events_for(OP_COMPARE, EVENT_END)
        .into_iter()
        .filter(|e| e.field("label") == Some(label))
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("record_count"), Some("1"));
}

#[test]
fn test_engine_malformed_tree_logs_end_error() {
    let capture = init_test_capture();
    let label = "engine-malformed-unique-10";
    let engine = DiffEngine::new(DiffConfig::default())
        .with_context(RequestContext::new().with_label(label));

    let err = engine
        .diff_values(&yaml("a: 1"), &yaml("a: !custom 1"))
        .unwrap_err();
    assert_eq!(err.code(), "ERR_MALFORMED_TREE");

    let errors: Vec<_> = capture
        .events_for(OP_DIFF_VALUES, EVENT_END_ERROR)
        .into_iter()
        .filter(|e| e.field("label") == Some(label))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err.code"), Some("ERR_MALFORMED_TREE"));
}

#[test]
fn test_engine_error_event_carries_request_id() {
    let capture = init_test_capture();
    let request_id = "engine-error-request-unique-12";
    let engine = DiffEngine::new(DiffConfig::default())
        .with_context(RequestContext::with_request_id(RequestId::from_string(request_id)));

    engine
        .compare(&yaml("a: !custom 1"), &yaml("a: 1"))
        .unwrap_err();

    let errors: Vec<_> = capture
        .events_for(OP_COMPARE, EVENT_END_ERROR)
        .into_iter()
        .filter(|e| e.fields.get("request_id").map(String::as_str) == Some(request_id))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err.code"), Some("ERR_MALFORMED_TREE"));
}

#[test]
fn test_engine_reconcile_logs_bucket_counts() {
    let capture = init_test_capture();
    let label = "engine-reconcile-unique-11";
    let engine = DiffEngine::new(DiffConfig::default())
        .with_context(RequestContext::new().with_label(label));

    let mut set_a = vec![cluster_role("foo", &["get"]), cluster_role("bar", &["get"])];
    let mut set_b = vec![cluster_role("bar", &["get", "list"])];
    engine.reconcile(&mut set_a, &mut set_b);

    capture.assert_event_exists(OP_RECONCILE, EVENT_START);
    let summary = capture
        .events()
        .into_iter()
        .find(|e| e.field("label") == Some(label) && e.fields.contains_key("removed"))
        .expect("Should have reconcile summary event");
    assert_eq!(summary.field("removed"), Some("1"));
    assert_eq!(summary.field("changed"), Some("1"));
    assert_eq!(summary.field("added"), Some("0"));
}

#[test]
fn test_error_conversion_preserves_context() {
    let err = DiffError::DuplicateIdentity {
        identity: "rbac.authorization.k8s.io/v1/ClusterRole/foo".to_string(),
        side: "A".to_string(),
        count: 2,
    };

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::DuplicateIdentity);
    assert_eq!(ex_err.code(), "ERR_DUPLICATE_IDENTITY");
    assert_eq!(
        ex_err.identity(),
        Some("rbac.authorization.k8s.io/v1/ClusterRole/foo")
    );
    assert_eq!(ex_err.op(), Some("reconcile"));
}
