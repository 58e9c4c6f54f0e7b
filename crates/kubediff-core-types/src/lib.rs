//! Core types shared across kubediff facilities
//!
//! This crate provides the small set of types used by both the engine's
//! logging facility and the command-line collaborator:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys, event names and operation names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
