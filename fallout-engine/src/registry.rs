//! Handler registration.
//!
//! A [`Registry`] maps each deleted-object type to the set of handlers that
//! react to it. Collaborator modules populate it from the application's
//! initialization path; gathers only read it.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register(HandlerRef::new(TeamMemberships::new(db.clone())))?;
//! registry.register(HandlerRef::new(MembershipAudit))?;
//!
//! let report = registry.gather(&TypeKey::new("org.Team"), teams)?;
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fallout_core::{ConfigurationError, HandlerRef, Object, TypeKey};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::{GatherError, GatherOptions, Gatherer, Report};

/// Mapping from deleted-object type to the handlers interested in it.
///
/// Handlers are deduplicated by identity: registering a clone of an already
/// registered [`HandlerRef`] is a no-op.
#[derive(Debug)]
pub struct Registry<O: Object> {
    handlers: IndexMap<TypeKey, IndexSet<HandlerRef<O>>>,
}

impl<O: Object> Default for Registry<O> {
    fn default() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }
}

impl<O: Object> Registry<O> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own `deleted_type()`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the handler has no deleted type or
    /// its label is invalid. The registry is left unchanged.
    pub fn register(&mut self, handler: HandlerRef<O>) -> Result<(), ConfigurationError> {
        let ty = deleted_type_of(&handler)?;
        self.insert(ty, handler);
        Ok(())
    }

    /// Register a handler for an explicit type.
    ///
    /// # Errors
    ///
    /// Fails like [`register`](Self::register), and with
    /// [`ConfigurationError::TypeMismatch`] if `ty` is not the handler's own
    /// deleted type.
    pub fn register_for(
        &mut self,
        ty: impl Into<TypeKey>,
        handler: HandlerRef<O>,
    ) -> Result<(), ConfigurationError> {
        let requested = ty.into();
        let declared = deleted_type_of(&handler)?;
        if declared != requested {
            return Err(ConfigurationError::TypeMismatch {
                handler: handler.name().to_string(),
                declared,
                requested,
            });
        }
        self.insert(declared, handler);
        Ok(())
    }

    /// Register several handlers, stopping at the first invalid one.
    ///
    /// Handlers before the invalid one stay registered.
    pub fn register_all(
        &mut self,
        handlers: impl IntoIterator<Item = HandlerRef<O>>,
    ) -> Result<(), ConfigurationError> {
        for handler in handlers {
            self.register(handler)?;
        }
        Ok(())
    }

    fn insert(&mut self, ty: TypeKey, handler: HandlerRef<O>) {
        let name = handler.name().to_string();
        let inserted = self.handlers.entry(ty.clone()).or_default().insert(handler);
        if inserted {
            debug!(handler = %name, deleted_type = %ty, "registered deletion handler");
        }
    }

    /// Handlers registered for `ty`, in registration order.
    pub fn handlers_for(&self, ty: &TypeKey) -> impl Iterator<Item = &HandlerRef<O>> {
        self.handlers.get(ty).into_iter().flatten()
    }

    /// Check whether `handler` is registered for `ty`.
    pub fn contains(&self, ty: &TypeKey, handler: &HandlerRef<O>) -> bool {
        self.handlers
            .get(ty)
            .is_some_and(|handlers| handlers.contains(handler))
    }

    /// Types with at least one registered handler.
    pub fn types(&self) -> impl Iterator<Item = &TypeKey> {
        self.handlers
            .iter()
            .filter(|(_, handlers)| !handlers.is_empty())
            .map(|(ty, _)| ty)
    }

    /// Total number of (type, handler) registrations.
    pub fn len(&self) -> usize {
        self.handlers.values().map(IndexSet::len).sum()
    }

    /// Check if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all registrations.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Gather the side effects of deleting `roots` with default options.
    pub fn gather(
        &self,
        root_type: &TypeKey,
        roots: impl IntoIterator<Item = O>,
    ) -> Result<Report<O>, GatherError> {
        Gatherer::new(self).gather(root_type, roots)
    }
}

fn deleted_type_of<O: Object>(handler: &HandlerRef<O>) -> Result<TypeKey, ConfigurationError> {
    let ty = handler
        .deleted_type()
        .ok_or_else(|| ConfigurationError::MissingDeletedType {
            handler: handler.name().to_string(),
        })?;
    if let Some(reason) = ty.validate() {
        return Err(ConfigurationError::InvalidDeletedType {
            handler: handler.name().to_string(),
            ty: ty.to_string(),
            reason,
        });
    }
    Ok(ty)
}

/// A registry shared across threads behind a single lock.
///
/// Registration takes the write lock; a gather holds the read lock for its
/// whole run, so registrations never interleave with an in-flight gather.
#[derive(Debug)]
pub struct SharedRegistry<O: Object> {
    inner: Arc<RwLock<Registry<O>>>,
}

impl<O: Object> Clone for SharedRegistry<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: Object> Default for SharedRegistry<O> {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl<O: Object> SharedRegistry<O> {
    /// Share an existing registry.
    pub fn new(registry: Registry<O>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Read access to the registry.
    ///
    /// A panic inside a handler does not leave the registry half-updated,
    /// so a poisoned lock is recovered rather than propagated.
    pub fn read(&self) -> RwLockReadGuard<'_, Registry<O>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the registry.
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry<O>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler under its own `deleted_type()`.
    pub fn register(&self, handler: HandlerRef<O>) -> Result<(), ConfigurationError> {
        self.write().register(handler)
    }

    /// Remove all registrations.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Gather under the read lock.
    pub fn gather(
        &self,
        root_type: &TypeKey,
        roots: impl IntoIterator<Item = O>,
        options: GatherOptions,
    ) -> Result<Report<O>, GatherError> {
        let registry = self.read();
        Gatherer::new(&registry)
            .with_options(options)
            .gather(root_type, roots)
    }
}

#[cfg(test)]
mod tests {
    use fallout_core::{Handler, ObjectRef};

    use super::*;
    use crate::testing::ScriptedHandler;

    fn user_type() -> TypeKey {
        TypeKey::new("auth.User")
    }

    struct Untyped;

    impl Handler<ObjectRef> for Untyped {
        fn deleted_type(&self) -> Option<TypeKey> {
            None
        }
    }

    struct BadLabel;

    impl Handler<ObjectRef> for BadLabel {
        fn deleted_type(&self) -> Option<TypeKey> {
            Some(TypeKey::new("auth..User"))
        }
    }

    #[test]
    fn test_register_single() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let handler = HandlerRef::new(ScriptedHandler::new("auth.User"));

        registry.register(handler.clone()).unwrap();

        let registered: Vec<_> = registry.handlers_for(&user_type()).collect();
        assert_eq!(registered, vec![&handler]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicates_is_noop() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let handler = HandlerRef::new(ScriptedHandler::new("auth.User"));

        for _ in 0..3 {
            registry.register(handler.clone()).unwrap();
        }

        assert_eq!(registry.handlers_for(&user_type()).count(), 1);
        assert!(registry.contains(&user_type(), &handler));
    }

    #[test]
    fn test_register_multiple() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let first = HandlerRef::new(ScriptedHandler::new("auth.User"));
        let second = HandlerRef::new(ScriptedHandler::new("auth.User"));

        registry.register(first.clone()).unwrap();
        registry.register(second.clone()).unwrap();

        let registered: Vec<_> = registry.handlers_for(&user_type()).cloned().collect();
        assert_eq!(registered, vec![first, second]);
    }

    #[test]
    fn test_register_missing_type_leaves_registry_unchanged() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let existing = HandlerRef::new(ScriptedHandler::new("auth.User"));
        registry.register(existing.clone()).unwrap();

        let err = registry.register(HandlerRef::new(Untyped)).unwrap_err();

        assert!(matches!(err, ConfigurationError::MissingDeletedType { .. }));
        assert!(err.handler().ends_with("Untyped"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.types().count(), 1);
        let registered: Vec<_> = registry.handlers_for(&user_type()).cloned().collect();
        assert_eq!(registered, vec![existing]);
    }

    #[test]
    fn test_register_invalid_label_leaves_registry_unchanged() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let existing = HandlerRef::new(ScriptedHandler::new("auth.User"));
        registry.register(existing.clone()).unwrap();

        let err = registry.register(HandlerRef::new(BadLabel)).unwrap_err();

        assert!(matches!(err, ConfigurationError::InvalidDeletedType { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.types().count(), 1);
        let registered: Vec<_> = registry.handlers_for(&user_type()).cloned().collect();
        assert_eq!(registered, vec![existing]);
    }

    #[test]
    fn test_register_for_checks_type() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let handler = HandlerRef::new(ScriptedHandler::new("auth.User"));

        let err = registry
            .register_for("auth.Group", handler.clone())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::TypeMismatch { .. }));
        assert!(registry.is_empty());

        registry.register_for("auth.User", handler.clone()).unwrap();
        assert!(registry.contains(&user_type(), &handler));
    }

    #[test]
    fn test_register_all_stops_at_first_error() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        let good = HandlerRef::new(ScriptedHandler::new("auth.User"));
        let after = HandlerRef::new(ScriptedHandler::new("auth.Group"));

        let result = registry.register_all([good.clone(), HandlerRef::new(Untyped), after.clone()]);

        assert!(result.is_err());
        assert!(registry.contains(&user_type(), &good));
        assert!(!registry.contains(&TypeKey::new("auth.Group"), &after));
    }

    #[test]
    fn test_handlers_for_unknown_type_is_empty() {
        let registry: Registry<ObjectRef> = Registry::new();
        assert_eq!(registry.handlers_for(&user_type()).count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut registry: Registry<ObjectRef> = Registry::new();
        registry
            .register(HandlerRef::new(ScriptedHandler::new("auth.User")))
            .unwrap();
        registry
            .register(HandlerRef::new(ScriptedHandler::new("auth.Group")))
            .unwrap();
        assert_eq!(registry.types().count(), 2);

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.handlers_for(&user_type()).count(), 0);
    }

    #[test]
    fn test_shared_registry() {
        let shared: SharedRegistry<ObjectRef> = SharedRegistry::default();
        let handler = HandlerRef::new(
            ScriptedHandler::new("auth.User")
                .affects(vec![ObjectRef::new("auth.Group", 1)])
                .message("{count} groups"),
        );

        let writer = shared.clone();
        std::thread::spawn(move || writer.register(handler))
            .join()
            .unwrap()
            .unwrap();

        let report = shared
            .gather(
                &user_type(),
                [ObjectRef::new("auth.User", 1)],
                GatherOptions::default(),
            )
            .unwrap();
        assert_eq!(report.messages(), vec!["1 groups"]);

        shared.clear();
        assert!(shared.read().is_empty());
    }
}
