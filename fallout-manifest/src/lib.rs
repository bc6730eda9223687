//! `fallout.toml` parsing and validation.
//!
//! The manifest configures the cascade limits of the engine and declares
//! rule-based handlers: "when objects of type T are deleted, the targets of
//! relation R are affected and the targets of relations C are deleted too".

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod engine;
mod error;
mod handler;
mod manifest;
mod template;

pub use engine::EngineConfig;
pub use error::{Error, Result, SourceContext};
pub use handler::HandlerSpec;
pub use manifest::{FalloutToml, Manifest, ParseContext, parse_manifest};
pub use template::{MessageTemplate, Placeholder, TemplateError, TemplateValues};
