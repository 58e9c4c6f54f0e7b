//! Structured logging facility for kubediff
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - [`OpSpan`], a scoped guard that owns the start/end boundary of one operation
//!   and carries the caller's correlation identifiers on its span
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use kubediff_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! Events are written to stderr so that reports printed on stdout stay clean.

pub mod init;
pub mod macros;
pub mod span;
pub mod test_capture;

pub use init::{init, Profile};
pub use span::OpSpan;
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
