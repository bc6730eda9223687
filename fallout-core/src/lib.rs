//! Core types for the Fallout deletion side-effect engine.
//!
//! This crate defines the vocabulary shared by the rest of the workspace:
//! the type labels handlers are keyed by, the [`Object`] contract hosts
//! implement for their model instances, and the [`Handler`] trait that
//! collaborator modules implement to declare deletion side effects.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod handler;
mod object;
mod type_key;

pub use error::ConfigurationError;
pub use handler::{Handler, HandlerError, HandlerRef, SideEffects};
pub use object::{Object, ObjectId, ObjectRef};
pub use type_key::{TypeKey, validate_identifier, validate_type_label};
