//! Manifest types and parsing for fallout.toml files.

mod file;
mod parse;
mod validate;

pub use file::FalloutToml;
use fallout_core::TypeKey;
use indexmap::IndexMap;
pub use parse::parse_manifest;
use serde::Deserialize;
pub use validate::ParseContext;

use crate::{EngineConfig, HandlerSpec};

/// Root manifest for fallout.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Cascade limits
    #[serde(default)]
    pub engine: EngineConfig,

    /// Declarative handlers, in declaration order
    #[serde(default)]
    pub handlers: IndexMap<String, HandlerSpec>,
}

impl Manifest {
    /// Handlers reacting to the given type, with their names.
    pub fn handlers_for<'a>(
        &'a self,
        ty: &'a TypeKey,
    ) -> impl Iterator<Item = (&'a str, &'a HandlerSpec)> + 'a {
        self.handlers
            .iter()
            .filter(move |(_, spec)| &spec.deleted_type == ty)
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Distinct deleted types, in order of first declaration.
    pub fn deleted_types(&self) -> Vec<&TypeKey> {
        let mut types: Vec<&TypeKey> = Vec::new();
        for spec in self.handlers.values() {
            if !types.contains(&&spec.deleted_type) {
                types.push(&spec.deleted_type);
            }
        }
        types
    }
}
