//! Cascading side-effect gathering.
//!
//! The gatherer walks the deletion cascade one type-group at a time. Every
//! handler registered for a group's type sees all of that group's objects in
//! a single call, so it can aggregate (count, summarize) without keeping its
//! own state. Objects are marked deleted when first discovered; an object is
//! never queued twice, which also makes circular handler graphs terminate.

use std::collections::VecDeque;

use fallout_core::{HandlerRef, Object, TypeKey};
use fallout_manifest::EngineConfig;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::{GatherError, Registry, Report, ReportRow, error::Stage};

/// Limits applied to a single gather. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatherOptions {
    /// Deepest cascade level processed; the roots are level 0.
    pub max_depth: Option<usize>,
    /// Maximum number of objects marked as deleted, roots included.
    pub max_deleted: Option<usize>,
}

impl From<&EngineConfig> for GatherOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_deleted: config.max_deleted,
        }
    }
}

/// One type-group waiting to be processed.
struct Level<O> {
    ty: TypeKey,
    objects: IndexSet<O>,
    depth: usize,
}

/// State scoped to one gather call.
struct GatherState<O: Object> {
    /// Every object known to be deleted. Growth-only.
    all_deleted: IndexSet<O>,
    /// Everything each handler reported as affected. Growth-only.
    accumulated: IndexMap<HandlerRef<O>, IndexSet<O>>,
    max_deleted: Option<usize>,
}

impl<O: Object> GatherState<O> {
    fn new(max_deleted: Option<usize>) -> Self {
        Self {
            all_deleted: IndexSet::new(),
            accumulated: IndexMap::new(),
            max_deleted,
        }
    }

    /// Mark `object` deleted. Returns false if it already was.
    fn mark_deleted(&mut self, object: O) -> Result<bool, GatherError> {
        if !self.all_deleted.insert(object) {
            return Ok(false);
        }
        match self.max_deleted {
            Some(limit) if self.all_deleted.len() > limit => {
                Err(GatherError::TooManyObjects { limit })
            }
            _ => Ok(true),
        }
    }

    fn record_affected(&mut self, handler: &HandlerRef<O>, affected: Vec<O>) {
        if affected.is_empty() {
            return;
        }
        self.accumulated
            .entry(handler.clone())
            .or_default()
            .extend(affected);
    }
}

/// Gathers the side effects of a deletion from a [`Registry`].
///
/// # Example
///
/// ```ignore
/// let report = Gatherer::new(&registry)
///     .with_options(GatherOptions::from(&manifest.engine))
///     .gather(&TypeKey::new("org.Team"), teams)?;
///
/// for row in report.rows() {
///     println!("{}", row.message);
/// }
/// ```
pub struct Gatherer<'r, O: Object> {
    registry: &'r Registry<O>,
    options: GatherOptions,
}

impl<'r, O: Object> Gatherer<'r, O> {
    /// Create a gatherer with default options.
    pub fn new(registry: &'r Registry<O>) -> Self {
        Self {
            registry,
            options: GatherOptions::default(),
        }
    }

    /// Use the given limits.
    pub fn with_options(mut self, options: GatherOptions) -> Self {
        self.options = options;
        self
    }

    /// Gather the side effects of deleting `roots` as objects of `root_type`.
    ///
    /// Every root is handed to the handlers of `root_type`, whatever its own
    /// type key says.
    ///
    /// # Errors
    ///
    /// Any handler failure aborts the gather; no partial report is returned.
    /// When set, `max_depth` and `max_deleted` abort the gather too.
    pub fn gather(
        &self,
        root_type: &TypeKey,
        roots: impl IntoIterator<Item = O>,
    ) -> Result<Report<O>, GatherError> {
        let mut state = GatherState::new(self.options.max_deleted);

        let mut root_set = IndexSet::new();
        for root in roots {
            let found = root.type_key();
            if &found != root_type {
                debug!(
                    root_type = %root_type,
                    found = %found,
                    "root gathered under another type"
                );
            }
            if state.mark_deleted(root.clone())? {
                root_set.insert(root);
            }
        }

        if root_set.is_empty() {
            return Ok(Report::default());
        }

        let mut queue = VecDeque::from([Level {
            ty: root_type.clone(),
            objects: root_set,
            depth: 0,
        }]);
        let mut levels = 0;

        while let Some(level) = queue.pop_front() {
            if let Some(limit) = self.options.max_depth.filter(|&limit| level.depth > limit) {
                return Err(GatherError::DepthExceeded {
                    limit,
                    ty: level.ty,
                });
            }
            levels += 1;

            for (ty, objects) in self.process(&level, &mut state)? {
                queue.push_back(Level {
                    ty,
                    objects,
                    depth: level.depth + 1,
                });
            }
        }

        let report = self.build_report(state, levels)?;
        debug!(
            root_type = %root_type,
            rows = report.rows().len(),
            deleted = report.deleted().len(),
            levels,
            "gathered deletion side effects"
        );
        Ok(report)
    }

    /// Run every handler for one type-group and return the newly discovered
    /// deletions, grouped by type.
    fn process(
        &self,
        level: &Level<O>,
        state: &mut GatherState<O>,
    ) -> Result<IndexMap<TypeKey, IndexSet<O>>, GatherError> {
        debug!(
            deleted_type = %level.ty,
            objects = level.objects.len(),
            depth = level.depth,
            "processing cascade level"
        );

        let candidates: Vec<O> = level.objects.iter().cloned().collect();
        let mut next_level: IndexMap<TypeKey, IndexSet<O>> = IndexMap::new();

        for handler in self.registry.handlers_for(&level.ty) {
            let effects = handler
                .compute_side_effects(&candidates)
                .map_err(|e| GatherError::handler(handler.name(), Stage::ComputeSideEffects, e))?;
            trace!(
                handler = handler.name(),
                affected = effects.affected.len(),
                cascade = effects.cascade.len(),
                "computed side effects"
            );

            state.record_affected(handler, effects.affected);

            for object in effects.cascade {
                if state.mark_deleted(object.clone())? {
                    next_level
                        .entry(object.type_key())
                        .or_default()
                        .insert(object);
                }
            }
        }

        Ok(next_level)
    }

    fn build_report(&self, state: GatherState<O>, levels: usize) -> Result<Report<O>, GatherError> {
        let mut rows = Vec::with_capacity(state.accumulated.len());

        for (handler, objects) in state.accumulated {
            let affected_objects: Vec<O> = objects.into_iter().collect();
            let message = handler
                .describe(&affected_objects)
                .map_err(|e| GatherError::handler(handler.name(), Stage::Describe, e))?;
            rows.push(ReportRow {
                handler: handler.name().to_string(),
                message,
                affected_objects,
            });
        }

        Ok(Report::new(
            rows,
            state.all_deleted.into_iter().collect(),
            levels,
        ))
    }
}
