//! The object contract hosts implement for their model instances.

use std::{fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::TypeKey;

/// An identity-comparable instance supplied by the host's object layer.
///
/// Only two properties matter to the engine: the runtime type, used to
/// look up handlers, and the identity (`Eq + Hash`), used for
/// deduplication. The engine never mutates objects.
pub trait Object: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Runtime type of this object.
    fn type_key(&self) -> TypeKey;
}

/// Primary key of an [`ObjectRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    /// Integer primary key.
    Int(i64),
    /// String primary key (UUIDs, slugs, natural keys).
    Key(String),
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Int(id) => write!(f, "{}", id),
            ObjectId::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for ObjectId {
    fn from(id: i64) -> Self {
        ObjectId::Int(id)
    }
}

impl From<i32> for ObjectId {
    fn from(id: i32) -> Self {
        ObjectId::Int(i64::from(id))
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        ObjectId::Int(i64::from(id))
    }
}

impl From<&str> for ObjectId {
    fn from(key: &str) -> Self {
        ObjectId::Key(key.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(key: String) -> Self {
        ObjectId::Key(key)
    }
}

/// A reference to a host object by model label and primary key.
///
/// This is the ready-made [`Object`] for hosts that identify rows by
/// `(model, pk)`; two references are the same object when both match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Model label of the referenced object.
    #[serde(rename = "type")]
    pub ty: TypeKey,
    /// Primary key of the referenced object.
    pub id: ObjectId,
}

impl ObjectRef {
    /// Create a reference to `ty` with primary key `id`.
    pub fn new(ty: impl Into<TypeKey>, id: impl Into<ObjectId>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }
}

impl Object for ObjectRef {
    fn type_key(&self) -> TypeKey {
        self.ty.clone()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.ty, self.id)
    }
}
