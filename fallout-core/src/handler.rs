//! The handler trait collaborators implement to declare deletion side effects.

use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use crate::{Object, TypeKey};

/// Error returned by a handler.
///
/// The engine never inspects or rewraps this beyond attaching the handler
/// name, so callers can downcast it back to their own error type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The outcome of one [`Handler::compute_side_effects`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffects<O> {
    /// Objects impacted by the deletion (not necessarily deleted themselves).
    pub affected: Vec<O>,
    /// Objects that will be deleted as a consequence.
    pub cascade: Vec<O>,
}

impl<O> SideEffects<O> {
    /// Side effects with the given affected and cascade-deleted objects.
    pub fn new(affected: Vec<O>, cascade: Vec<O>) -> Self {
        Self { affected, cascade }
    }

    /// No side effects at all.
    pub fn none() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Only affected objects, no cascade.
    pub fn affected(affected: Vec<O>) -> Self {
        Self::new(affected, Vec::new())
    }

    /// Add cascade-deleted objects.
    pub fn with_cascade(mut self, cascade: Vec<O>) -> Self {
        self.cascade = cascade;
        self
    }

    /// Returns true if nothing is affected and nothing cascades.
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty() && self.cascade.is_empty()
    }
}

impl<O> Default for SideEffects<O> {
    fn default() -> Self {
        Self::none()
    }
}

impl<O> From<(Vec<O>, Vec<O>)> for SideEffects<O> {
    fn from((affected, cascade): (Vec<O>, Vec<O>)) -> Self {
        Self::new(affected, cascade)
    }
}

/// Reacts to the deletion of objects of one type.
///
/// Implementations must be pure functions of their input: the engine may
/// call [`compute_side_effects`](Handler::compute_side_effects) several times
/// during one gather with different, non-overlapping candidate sets, and
/// calls [`describe`](Handler::describe) exactly once with the union of
/// everything the handler reported as affected.
///
/// # Example
///
/// ```ignore
/// struct MembershipSideEffects;
///
/// impl Handler<ObjectRef> for MembershipSideEffects {
///     fn deleted_type(&self) -> Option<TypeKey> {
///         Some(TypeKey::new("org.Team"))
///     }
///
///     fn compute_side_effects(&self, teams: &[ObjectRef]) -> Result<SideEffects<ObjectRef>, HandlerError> {
///         let members = lookup_members(teams)?;
///         Ok(SideEffects::affected(members))
///     }
///
///     fn describe(&self, members: &[ObjectRef]) -> Result<String, HandlerError> {
///         Ok(format!("{} members will lose access", members.len()))
///     }
/// }
/// ```
pub trait Handler<O: Object>: Send + Sync {
    /// The name of this handler (for logging and error messages).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The type of object this handler reacts to.
    ///
    /// Returning `None` makes the handler unregistrable.
    fn deleted_type(&self) -> Option<TypeKey>;

    /// Compute the objects affected by deleting `candidates`, and the objects
    /// that will be cascade-deleted as a result.
    #[allow(unused_variables)]
    fn compute_side_effects(&self, candidates: &[O]) -> Result<SideEffects<O>, HandlerError> {
        Ok(SideEffects::none())
    }

    /// Summarize everything this handler reported as affected.
    #[allow(unused_variables)]
    fn describe(&self, affected: &[O]) -> Result<String, HandlerError> {
        Ok(String::new())
    }
}

/// Shared handle to a registered handler.
///
/// Equality and hashing use the identity of the shared allocation, not the
/// handler's contents: clones of one handle are the same handler, while two
/// separately constructed handlers are distinct even if they compare equal
/// field by field.
pub struct HandlerRef<O: Object>(Arc<dyn Handler<O>>);

impl<O: Object> HandlerRef<O> {
    /// Wrap a handler in a new shared handle.
    pub fn new(handler: impl Handler<O> + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Address of the shared allocation, without the vtable.
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl<O: Object> Clone for HandlerRef<O> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<O: Object> PartialEq for HandlerRef<O> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl<O: Object> Eq for HandlerRef<O> {}

impl<O: Object> Hash for HandlerRef<O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<O: Object> Deref for HandlerRef<O> {
    type Target = dyn Handler<O>;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl<O: Object> fmt::Debug for HandlerRef<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef").field(&self.0.name()).finish()
    }
}

impl<O: Object, H: Handler<O> + 'static> From<Arc<H>> for HandlerRef<O> {
    fn from(handler: Arc<H>) -> Self {
        Self(handler)
    }
}
