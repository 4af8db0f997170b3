// =====================================================================
// File: trace/mod.rs
//
//! The `trace` module holds what an engine operation produces and the
//! viewer that plays it back.
//!
//! Structure:
//! - `event.rs`  : [`Trace`], [`TraceEvent`], [`EventKind`] and the
//!                 snapshot arena events point into.
//! - `viewer.rs` : [`TraceViewer`] cursor and [`Highlight`] resolution.
//! - `tests.rs`  : Unit tests (compiled only in test mode).
// =====================================================================

pub mod event;
pub mod viewer;

pub(crate) use self::event::TraceRecorder;
pub use self::event::{
    EventKind, NodeSnapshot, Operation, Outcome, SnapshotId, SplitRecord, Trace, TraceEvent,
};
pub use self::viewer::{Highlight, Step, TraceViewer};
