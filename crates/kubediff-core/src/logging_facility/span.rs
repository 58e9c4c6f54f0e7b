//! Scoped operation boundary
//!
//! An [`OpSpan`] enters a tracing span for one engine operation, logs the
//! `start` event on creation and exactly one of `end` or `end_error` when it
//! is finished or dropped. Correlation identifiers are taken from the
//! `RequestContext` handed in by the caller and recorded on the span, so
//! every event emitted inside the operation inherits them.

use std::time::Instant;

use kubediff_core_types::{RequestContext, RequestId, TraceId};
use tracing::span::EnteredSpan;

use crate::errors::{DiffError, ExError};

/// Guard owning the start/end boundary of a single operation
#[must_use = "dropping the guard immediately ends the operation"]
pub struct OpSpan {
    op: &'static str,
    started: Instant,
    finished: bool,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    _entered: EnteredSpan,
}

impl OpSpan {
    /// Enter the span for `op` and log its start event
    pub fn enter(op: &'static str, ctx: Option<&RequestContext>) -> Self {
        let span = match ctx {
            Some(ctx) => tracing::info_span!(
                "kubediff_op",
                op,
                request_id = %ctx.request_id,
                trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
                label = ctx.label.as_deref(),
            ),
            None => tracing::info_span!("kubediff_op", op),
        };
        let entered = span.entered();
        crate::log_op_start!(op);
        Self {
            op,
            started: Instant::now(),
            finished: false,
            request_id: ctx.map(|c| c.request_id.clone()),
            trace_id: ctx.and_then(|c| c.trace_id.clone()),
            _entered: entered,
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Milliseconds since the span was entered
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Log the end event with the number of difference records produced
    pub fn finish_with_records(mut self, record_count: usize) {
        crate::log_op_end!(
            self.op,
            duration_ms = self.elapsed_ms(),
            record_count = record_count
        );
        self.finished = true;
    }

    /// Structured form of `err` tagged with this operation's correlation ids
    ///
    /// The operation name is filled in only when the error does not already
    /// name a more specific one.
    pub fn error(&self, err: &DiffError) -> ExError {
        let mut ex_err = ExError::from(err);
        if ex_err.op().is_none() {
            ex_err = ex_err.with_op(self.op);
        }
        if let Some(request_id) = &self.request_id {
            ex_err = ex_err.with_request_id(request_id.clone());
        }
        if let Some(trace_id) = &self.trace_id {
            ex_err = ex_err.with_trace_id(trace_id.clone());
        }
        ex_err
    }

    /// Log the end_error event for `err`
    pub fn fail(mut self, err: &DiffError) {
        let ex_err = self.error(err);
        crate::log_op_error!(self.op, ex_err, duration_ms = self.elapsed_ms());
        self.finished = true;
    }
}

impl Drop for OpSpan {
    fn drop(&mut self) {
        if !self.finished {
            crate::log_op_end!(self.op, duration_ms = self.elapsed_ms());
        }
    }
}
