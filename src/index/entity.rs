//! Index for unversioned entities.

use crate::types::Entity;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Index holding one entity per id.
pub struct EntityIndex<E> {
    /// id -> entity.
    entities: RwLock<HashMap<String, Arc<E>>>,
}

impl<E: Entity> Default for EntityIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityIndex<E> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Get the entity stored under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<E>> {
        self.entities.read().get(id).cloned()
    }

    /// Snapshot of all entities.
    pub fn get_all(&self) -> Vec<Arc<E>> {
        self.entities.read().values().cloned().collect()
    }

    /// Store `entity` under `id`, replacing any previous entity.
    pub fn put(&self, id: impl Into<String>, entity: impl Into<Arc<E>>) {
        self.entities.write().insert(id.into(), entity.into());
    }

    /// Store each entity under its own id. Later duplicates win.
    pub fn put_all<I>(&self, entities: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<E>>,
    {
        let mut map = self.entities.write();
        let before = map.len();
        for entity in entities {
            let entity: Arc<E> = entity.into();
            map.insert(entity.id().to_string(), entity);
        }
        debug!(added = map.len() - before, "bulk insert into entity index");
    }

    /// Remove the entity stored under `id`.
    pub fn remove(&self, id: &str) -> Option<Arc<E>> {
        self.entities.write().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}
