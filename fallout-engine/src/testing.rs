//! Handler fixtures for exercising the engine.
//!
//! Enabled in this crate's own tests and, for downstream crates, through the
//! `testing` feature.

use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use fallout_core::{Handler, HandlerError, HandlerRef, ObjectRef, SideEffects, TypeKey};

use crate::error::Stage;

#[derive(Debug, Default)]
struct Calls {
    compute: AtomicUsize,
    describe: AtomicUsize,
    candidates: Mutex<Vec<Vec<ObjectRef>>>,
}

/// A handler that returns fixed side effects and records how it was called.
///
/// Clones share call statistics. Each call to [`handle`](Self::handle)
/// returns a separately registrable handler.
#[derive(Debug, Clone)]
pub struct ScriptedHandler {
    name: String,
    deleted_type: TypeKey,
    affected: Vec<ObjectRef>,
    cascade: Vec<ObjectRef>,
    message: String,
    calls: Arc<Calls>,
}

impl ScriptedHandler {
    /// A handler for `ty` with no side effects.
    pub fn new(ty: impl Into<TypeKey>) -> Self {
        let deleted_type = ty.into();
        Self {
            name: format!("scripted:{}", deleted_type),
            deleted_type,
            affected: Vec::new(),
            cascade: Vec::new(),
            message: "{count} affected".to_string(),
            calls: Arc::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Report `objects` as affected on every call.
    pub fn affects(mut self, objects: Vec<ObjectRef>) -> Self {
        self.affected = objects;
        self
    }

    /// Cascade-delete `objects` on every call.
    pub fn cascades(mut self, objects: Vec<ObjectRef>) -> Self {
        self.cascade = objects;
        self
    }

    /// Describe affected objects with `message`, replacing `{count}` and `{first}`.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn handle(&self) -> HandlerRef<ObjectRef> {
        HandlerRef::new(self.clone())
    }

    pub fn compute_calls(&self) -> usize {
        self.calls.compute.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.calls.describe.load(Ordering::SeqCst)
    }

    /// Candidate sets passed to `compute_side_effects`, in call order.
    pub fn candidates(&self) -> Vec<Vec<ObjectRef>> {
        self.calls
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Handler<ObjectRef> for ScriptedHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn deleted_type(&self) -> Option<TypeKey> {
        Some(self.deleted_type.clone())
    }

    fn compute_side_effects(
        &self,
        candidates: &[ObjectRef],
    ) -> Result<SideEffects<ObjectRef>, HandlerError> {
        self.calls.compute.fetch_add(1, Ordering::SeqCst);
        self.calls
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(candidates.to_vec());
        Ok(SideEffects::new(self.affected.clone(), self.cascade.clone()))
    }

    fn describe(&self, affected: &[ObjectRef]) -> Result<String, HandlerError> {
        self.calls.describe.fetch_add(1, Ordering::SeqCst);
        let first = affected
            .first()
            .map(|object| object.id.to_string())
            .unwrap_or_default();
        Ok(self
            .message
            .replace("{count}", &affected.len().to_string())
            .replace("{first}", &first))
    }
}

/// The error a [`FailingHandler`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub reason: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scripted failure: {}", self.reason)
    }
}

impl std::error::Error for ScriptError {}

/// A handler that fails at a chosen stage.
///
/// When failing in `describe`, it first reports its candidates as affected
/// so that `describe` is reached.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    deleted_type: TypeKey,
    stage: Stage,
    reason: String,
}

impl FailingHandler {
    pub fn new(ty: impl Into<TypeKey>, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            deleted_type: ty.into(),
            stage,
            reason: reason.into(),
        }
    }

    fn error(&self) -> HandlerError {
        Box::new(ScriptError {
            reason: self.reason.clone(),
        })
    }
}

impl Handler<ObjectRef> for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    fn deleted_type(&self) -> Option<TypeKey> {
        Some(self.deleted_type.clone())
    }

    fn compute_side_effects(
        &self,
        candidates: &[ObjectRef],
    ) -> Result<SideEffects<ObjectRef>, HandlerError> {
        match self.stage {
            Stage::ComputeSideEffects => Err(self.error()),
            Stage::Describe => Ok(SideEffects::affected(candidates.to_vec())),
        }
    }

    fn describe(&self, _affected: &[ObjectRef]) -> Result<String, HandlerError> {
        Err(self.error())
    }
}
