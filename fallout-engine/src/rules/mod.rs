//! Handlers declared in `fallout.toml`.
//!
//! A [`RuleHandler`] follows named relations through a [`RelationSource`]:
//! the targets of its `affected` relation are reported as affected, and the
//! targets of each `cascade` relation are deleted along with the candidates.

mod relations;

use std::sync::Arc;

use eyre::WrapErr;
use fallout_core::{
    ConfigurationError, Handler, HandlerError, HandlerRef, ObjectRef, SideEffects, TypeKey,
};
use fallout_manifest::{HandlerSpec, Manifest, TemplateValues};
use tracing::debug;

pub use relations::{ObjectGraph, RelationSource};

use crate::Registry;

/// Label used for `{type}` when affected objects have mixed types.
const MIXED_TYPE_LABEL: &str = "objects";

/// A handler driven by a [`HandlerSpec`].
pub struct RuleHandler {
    name: String,
    spec: HandlerSpec,
    source: Arc<dyn RelationSource>,
}

impl RuleHandler {
    pub fn new(name: impl Into<String>, spec: HandlerSpec, source: Arc<dyn RelationSource>) -> Self {
        Self {
            name: name.into(),
            spec,
            source,
        }
    }

    pub fn spec(&self) -> &HandlerSpec {
        &self.spec
    }

    fn follow(&self, candidates: &[ObjectRef], relation: &str) -> eyre::Result<Vec<ObjectRef>> {
        let mut targets = Vec::new();
        for object in candidates {
            let related = self
                .source
                .related(object, relation)
                .wrap_err_with(|| format!("failed to resolve relation '{relation}' of {object}"))?;
            targets.extend(related);
        }
        Ok(targets)
    }
}

impl std::fmt::Debug for RuleHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleHandler")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Handler<ObjectRef> for RuleHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn deleted_type(&self) -> Option<TypeKey> {
        Some(self.spec.deleted_type.clone())
    }

    fn compute_side_effects(
        &self,
        candidates: &[ObjectRef],
    ) -> Result<SideEffects<ObjectRef>, HandlerError> {
        let affected = match &self.spec.affected {
            Some(relation) => self.follow(candidates, relation)?,
            None => candidates.to_vec(),
        };

        let mut cascade = Vec::new();
        for relation in &self.spec.cascade {
            cascade.extend(self.follow(candidates, relation)?);
        }

        Ok(SideEffects::new(affected, cascade))
    }

    fn describe(&self, affected: &[ObjectRef]) -> Result<String, HandlerError> {
        let first = affected
            .first()
            .map(|object| object.id.to_string())
            .unwrap_or_default();

        Ok(self.spec.message.render(&TemplateValues {
            count: affected.len(),
            type_label: common_type_label(affected),
            first: &first,
        }))
    }
}

/// The type label shared by all `objects`, or [`MIXED_TYPE_LABEL`].
fn common_type_label(objects: &[ObjectRef]) -> &str {
    match objects.split_first() {
        Some((head, rest)) if rest.iter().all(|object| object.ty == head.ty) => head.ty.as_str(),
        _ => MIXED_TYPE_LABEL,
    }
}

/// Build a registry holding one [`RuleHandler`] per manifest handler.
///
/// # Errors
///
/// Returns the first [`ConfigurationError`]. Manifests loaded through
/// [`fallout_manifest::parse_manifest`] are already validated, so this only
/// fails for manifests constructed by hand.
pub fn registry_from_manifest(
    manifest: &Manifest,
    source: Arc<dyn RelationSource>,
) -> Result<Registry<ObjectRef>, ConfigurationError> {
    let mut registry = Registry::new();
    for (name, spec) in &manifest.handlers {
        let handler = RuleHandler::new(name.as_str(), spec.clone(), Arc::clone(&source));
        registry.register(HandlerRef::new(handler))?;
    }
    debug!(
        handlers = registry.len(),
        types = registry.types().count(),
        "built rule registry from manifest"
    );
    Ok(registry)
}
