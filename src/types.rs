//! Core types for the index.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An entity with a stable identifier.
pub trait Entity {
    /// Identifier, stable across revisions.
    fn id(&self) -> &str;
}

/// An entity that may exist in several revisions under the same id.
pub trait VersionedEntity: Entity {
    /// Revision label. Usually an integer sequence number, but free-form.
    fn version(&self) -> &str;
}

impl<T: Entity + ?Sized> Entity for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<T: VersionedEntity + ?Sized> VersionedEntity for &T {
    fn version(&self) -> &str {
        (**self).version()
    }
}

impl<T: Entity + ?Sized> Entity for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<T: VersionedEntity + ?Sized> VersionedEntity for Arc<T> {
    fn version(&self) -> &str {
        (**self).version()
    }
}

/// Index statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of ids with a non-empty revision set.
    pub id_count: u64,
    /// Total number of stored revisions.
    pub revision_count: u64,
    pub shard_count: u64,
}
