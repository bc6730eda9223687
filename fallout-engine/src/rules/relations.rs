use fallout_core::ObjectRef;
use indexmap::IndexMap;

/// Resolves named relations between host objects.
///
/// Hosts implement this over their object layer (for example by running the
/// reverse foreign-key query behind `relation`). A relation with no targets
/// resolves to an empty list.
pub trait RelationSource: Send + Sync {
    fn related(&self, object: &ObjectRef, relation: &str) -> eyre::Result<Vec<ObjectRef>>;
}

impl<F> RelationSource for F
where
    F: Fn(&ObjectRef, &str) -> eyre::Result<Vec<ObjectRef>> + Send + Sync,
{
    fn related(&self, object: &ObjectRef, relation: &str) -> eyre::Result<Vec<ObjectRef>> {
        self(object, relation)
    }
}

/// An in-memory relation graph.
///
/// # Example
///
/// ```ignore
/// let graph = ObjectGraph::new()
///     .with_link(team.clone(), "memberships", membership.clone())
///     .with_link(membership, "user", user);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    edges: IndexMap<ObjectRef, IndexMap<String, Vec<ObjectRef>>>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge `from --relation--> to`. Duplicate edges are ignored.
    pub fn link(&mut self, from: ObjectRef, relation: impl Into<String>, to: ObjectRef) {
        let targets = self
            .edges
            .entry(from)
            .or_default()
            .entry(relation.into())
            .or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// Builder form of [`link`](Self::link).
    pub fn with_link(mut self, from: ObjectRef, relation: impl Into<String>, to: ObjectRef) -> Self {
        self.link(from, relation, to);
        self
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RelationSource for ObjectGraph {
    fn related(&self, object: &ObjectRef, relation: &str) -> eyre::Result<Vec<ObjectRef>> {
        Ok(self
            .edges
            .get(object)
            .and_then(|relations| relations.get(relation))
            .cloned()
            .unwrap_or_default())
    }
}
