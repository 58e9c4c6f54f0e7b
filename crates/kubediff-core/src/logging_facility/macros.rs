//! Canonical logging macros
//!
//! Field names come from `kubediff_core_types::schema` so that every
//! operation boundary looks the same to log consumers.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use kubediff_core::log_op_start;
/// log_op_start!("reconcile");
/// log_op_start!("reconcile", identity = "apps/v1/Deployment/web");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use kubediff_core::log_op_end;
/// log_op_end!("diff_values", duration_ms = 3);
/// log_op_end!("diff_values", duration_ms = 3, record_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// `$err` may be a `DiffError`, a `&DiffError` or an `ExError`.
///
/// # Example
///
/// ```
/// # use kubediff_core::{log_op_error, errors::DiffError};
/// let err = DiffError::ValuesDecode { reason: "bad indentation".to_string() };
/// log_op_error!("diff_values", &err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            message = ex_err.message(),
            request_id = ex_err.request_id().map(|id| id.as_str()),
            trace_id = ex_err.trace_id().map(|id| id.as_str()),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::kubediff_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            message = ex_err.message(),
            request_id = ex_err.request_id().map(|id| id.as_str()),
            trace_id = ex_err.trace_id().map(|id| id.as_str()),
            $($field)*
        );
    }};
}
