//! Registry and cascade gatherer for deletion side effects.
//!
//! Collaborators register [`Handler`](fallout_core::Handler)s in a
//! [`Registry`]; a [`Gatherer`] then walks the deletion cascade starting from
//! a set of root objects and produces a [`Report`] with one row per handler
//! that reported affected objects. Nothing is ever deleted here: the host
//! performs the deletions after inspecting the report.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod gather;
mod registry;
mod report;
pub mod rules;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{GatherError, Stage};
pub use gather::{GatherOptions, Gatherer};
pub use registry::{Registry, SharedRegistry};
pub use report::{Report, ReportRow};
pub use rules::{ObjectGraph, RelationSource, RuleHandler, registry_from_manifest};
