//! Versioned entity index.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::types::{Entity, IndexStats, VersionedEntity};
use crate::version::{select_by_version, select_latest};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Revisions grouped by id, ready to be applied shard by shard.
type ShardGroups<E> = Vec<HashMap<String, Vec<Arc<E>>>>;

/// One lock-guarded partition of the index.
///
/// Holds both the revision sets and the latest projection of the ids hashing
/// to it, so the two are always updated under the same write lock.
struct Shard<E> {
    /// id -> all revisions, in insertion order.
    revisions: HashMap<String, Vec<Arc<E>>>,

    /// id -> revision selected by `select_latest`.
    latest: HashMap<String, Arc<E>>,
}

impl<E: VersionedEntity> Shard<E> {
    fn new() -> Self {
        Self {
            revisions: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    /// Replace the revision set of `id` and recompute its projection entry.
    /// An empty set removes the id.
    fn replace(&mut self, id: String, revisions: Vec<Arc<E>>) {
        match select_latest(&revisions).cloned() {
            Some(latest) => {
                self.latest.insert(id.clone(), latest);
                self.revisions.insert(id, revisions);
            }
            None => {
                self.remove(&id);
            }
        }
    }

    /// Upsert revisions by version label, then recompute the projection.
    fn merge(&mut self, id: String, incoming: Vec<Arc<E>>) {
        let mut revisions = self.revisions.remove(&id).unwrap_or_default();
        for entity in incoming {
            match revisions
                .iter()
                .position(|r| r.version() == entity.version())
            {
                Some(pos) => revisions[pos] = entity,
                None => revisions.push(entity),
            }
        }
        self.replace(id, revisions);
    }

    fn remove(&mut self, id: &str) -> Vec<Arc<E>> {
        self.latest.remove(id);
        self.revisions.remove(id).unwrap_or_default()
    }

    fn clear(&mut self) {
        self.latest.clear();
        self.revisions.clear();
    }
}

/// Index holding every revision of each entity, plus the latest revision
/// per id.
///
/// Ids are spread over independently locked shards. Per-id operations lock a
/// single shard, so writers to different ids rarely contend. Full snapshots
/// read-lock every shard in order and therefore never observe a half-applied
/// mutation.
///
/// Mutations never fail and lookups report absence as `None` or an empty
/// collection.
pub struct VersionedIndex<E> {
    shards: Box<[RwLock<Shard<E>>]>,
    hasher: RandomState,
}

impl<E: VersionedEntity> Default for VersionedIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: VersionedEntity> VersionedIndex<E> {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self::with_shards(IndexConfig::default().shard_count)
    }

    /// Create an empty index from a configuration.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        debug!(shard_count = config.shard_count, "creating versioned index");
        Ok(Self::with_shards(config.shard_count))
    }

    fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count)
            .map(|_| RwLock::new(Shard::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard_index(&self, id: &str) -> usize {
        (self.hasher.hash_one(id) % self.shards.len() as u64) as usize
    }

    fn shard(&self, id: &str) -> &RwLock<Shard<E>> {
        &self.shards[self.shard_index(id)]
    }

    /// Read-lock every shard, in ascending order.
    fn read_all(&self) -> Vec<RwLockReadGuard<'_, Shard<E>>> {
        self.shards.iter().map(|s| s.read()).collect()
    }

    // --- Lookups ---

    /// Get the latest revision of `id`.
    pub fn get_latest_version(&self, id: &str) -> Option<Arc<E>> {
        self.shard(id).read().latest.get(id).cloned()
    }

    /// Get the revision of `id` labelled `version`.
    pub fn get_version(&self, id: &str, version: &str) -> Option<Arc<E>> {
        let shard = self.shard(id).read();
        shard
            .revisions
            .get(id)
            .and_then(|revisions| select_by_version(revisions, version))
            .cloned()
    }

    /// Snapshot of the latest revision of every id.
    pub fn get_latest_versions(&self) -> Vec<Arc<E>> {
        let shards = self.read_all();
        shards
            .iter()
            .flat_map(|shard| shard.latest.values().cloned())
            .collect()
    }

    /// All revisions of `id`. Empty if the id is unknown.
    pub fn get_all_versions(&self, id: &str) -> Vec<Arc<E>> {
        self.shard(id)
            .read()
            .revisions
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every revision set, keyed by id.
    pub fn get_all_versions_by_id(&self) -> HashMap<String, Vec<Arc<E>>> {
        let shards = self.read_all();
        shards
            .iter()
            .flat_map(|shard| {
                shard
                    .revisions
                    .iter()
                    .map(|(id, revisions)| (id.clone(), revisions.clone()))
            })
            .collect()
    }

    /// Whether `id` has at least one revision.
    pub fn contains(&self, id: &str) -> bool {
        self.shard(id).read().revisions.contains_key(id)
    }

    /// Number of ids with at least one revision.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().revisions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().revisions.is_empty())
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        let shards = self.read_all();
        let mut stats = IndexStats {
            shard_count: shards.len() as u64,
            ..Default::default()
        };
        for shard in shards.iter() {
            stats.id_count += shard.revisions.len() as u64;
            stats.revision_count += shard
                .revisions
                .values()
                .map(|revisions| revisions.len() as u64)
                .sum::<u64>();
        }
        stats
    }

    // --- Mutations ---

    /// Replace every revision of `id` with `entities`.
    ///
    /// An empty `entities` removes the id.
    pub fn put<I>(&self, id: impl Into<String>, entities: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<E>>,
    {
        let id = id.into();
        let revisions: Vec<Arc<E>> = entities.into_iter().map(Into::into).collect();

        if revisions.iter().any(|e| e.id() != id.as_str()) {
            warn!(id = %id, "revision set contains entities with a different id");
        }
        trace!(id = %id, revisions = revisions.len(), "replacing revision set");

        self.shard(&id).write().replace(id, revisions);
    }

    /// Group `entities` by id and replace the revision set of each id present.
    ///
    /// Ids absent from the input are untouched. Atomic per id only.
    pub fn put_all<I>(&self, entities: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<E>>,
    {
        let groups = self.group_by_shard(entities);
        for (shard, group) in self.shards.iter().zip(groups) {
            if group.is_empty() {
                continue;
            }
            let mut shard = shard.write();
            for (id, revisions) in group {
                shard.replace(id, revisions);
            }
        }
    }

    /// Group `entities` by id and add them to the existing revision sets.
    ///
    /// A stored revision with the same version label is replaced, any other
    /// revision is appended. Atomic per id only.
    pub fn merge_all<I>(&self, entities: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<E>>,
    {
        let groups = self.group_by_shard(entities);
        for (shard, group) in self.shards.iter().zip(groups) {
            if group.is_empty() {
                continue;
            }
            let mut shard = shard.write();
            for (id, revisions) in group {
                shard.merge(id, revisions);
            }
        }
    }

    /// Remove every revision of `id`, returning them.
    pub fn remove(&self, id: &str) -> Vec<Arc<E>> {
        let removed = self.shard(id).write().remove(id);
        trace!(id = %id, revisions = removed.len(), "removed revision set");
        removed
    }

    /// Remove everything.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
        debug!("cleared versioned index");
    }

    /// Bucket entities by shard, then by id, keeping input order within an id.
    fn group_by_shard<I>(&self, entities: I) -> ShardGroups<E>
    where
        I: IntoIterator,
        I::Item: Into<Arc<E>>,
    {
        let mut groups: ShardGroups<E> = (0..self.shards.len()).map(|_| HashMap::new()).collect();
        let mut count = 0usize;

        for entity in entities {
            let entity: Arc<E> = entity.into();
            let shard = self.shard_index(entity.id());
            groups[shard]
                .entry(entity.id().to_string())
                .or_default()
                .push(entity);
            count += 1;
        }

        debug!(
            entities = count,
            ids = groups.iter().map(HashMap::len).sum::<usize>(),
            "grouped entities for bulk update"
        );
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct StopPlace {
        id: String,
        version: String,
        name: String,
    }

    impl Entity for StopPlace {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl VersionedEntity for StopPlace {
        fn version(&self) -> &str {
            &self.version
        }
    }

    fn new_index() -> VersionedIndex<StopPlace> {
        VersionedIndex::new()
    }

    fn stop(id: &str, version: &str) -> StopPlace {
        StopPlace {
            id: id.into(),
            version: version.into(),
            name: format!("{} v{}", id, version),
        }
    }

    #[test]
    fn test_put_and_lookup() {
        let index = new_index();
        index.put("A", vec![stop("A", "1"), stop("A", "3"), stop("A", "2")]);

        assert_eq!(index.get_latest_version("A").unwrap().version, "3");
        assert_eq!(index.get_version("A", "2").unwrap().name, "A v2");
        assert!(index.get_version("A", "9").is_none());
        assert_eq!(index.get_all_versions("A").len(), 3);
        assert!(index.contains("A"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let index = new_index();

        assert!(index.get_latest_version("missing").is_none());
        assert!(index.get_version("missing", "1").is_none());
        assert!(index.get_all_versions("missing").is_empty());
        assert!(index.remove("missing").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_put_empty_clears() {
        let index = new_index();
        index.put("A", vec![stop("A", "1")]);
        index.put("A", Vec::<StopPlace>::new());

        assert!(!index.contains("A"));
        assert!(index.get_latest_version("A").is_none());
        assert!(index.get_latest_versions().is_empty());
        assert!(index.get_all_versions_by_id().is_empty());
    }

    #[test]
    fn test_put_replaces_whole_set() {
        let index = new_index();
        index.put("A", vec![stop("A", "1"), stop("A", "5")]);
        index.put("A", vec![stop("A", "2")]);

        let all = index.get_all_versions("A");
        assert_eq!(all.len(), 1);
        assert_eq!(index.get_latest_version("A").unwrap().version, "2");
        assert!(index.get_version("A", "5").is_none());
    }

    #[test]
    fn test_put_accepts_shared_entities() {
        let index = new_index();
        let shared = Arc::new(stop("A", "1"));
        index.put("A", vec![Arc::clone(&shared)]);

        let latest = index.get_latest_version("A").unwrap();
        assert!(Arc::ptr_eq(&latest, &shared));
    }

    #[test]
    fn test_put_all_groups_by_id() {
        let index = new_index();
        index.put("C", vec![stop("C", "1")]);
        index.put_all(vec![stop("A", "1"), stop("A", "2"), stop("B", "1")]);

        assert_eq!(index.get_all_versions("A").len(), 2);
        assert_eq!(index.get_all_versions("B").len(), 1);
        assert_eq!(index.get_latest_version("A").unwrap().version, "2");
        // Untouched.
        assert_eq!(index.get_all_versions("C").len(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_put_all_keeps_input_order_for_ties() {
        let index = new_index();
        let mut first = stop("A", "4");
        first.name = "first".into();
        let mut second = stop("A", "4");
        second.name = "second".into();
        index.put_all(vec![first, second]);

        assert_eq!(index.get_latest_version("A").unwrap().name, "first");
        assert_eq!(index.get_version("A", "4").unwrap().name, "first");
    }

    #[test]
    fn test_merge_all_upserts() {
        let index = new_index();
        index.put("A", vec![stop("A", "1"), stop("A", "2")]);

        let mut replacement = stop("A", "2");
        replacement.name = "renamed".into();
        index.merge_all(vec![replacement, stop("A", "3"), stop("B", "1")]);

        assert_eq!(index.get_all_versions("A").len(), 3);
        assert_eq!(index.get_version("A", "2").unwrap().name, "renamed");
        assert_eq!(index.get_latest_version("A").unwrap().version, "3");
        assert_eq!(index.get_latest_version("B").unwrap().version, "1");
    }

    #[test]
    fn test_remove_clears_both_views() {
        let index = new_index();
        index.put_all(vec![stop("A", "1"), stop("B", "1")]);

        let removed = index.remove("A");
        assert_eq!(removed.len(), 1);
        assert!(index.get_latest_version("A").is_none());
        assert!(index.get_version("A", "1").is_none());
        assert!(!index.get_all_versions_by_id().contains_key("A"));
        assert_eq!(index.get_latest_versions().len(), 1);
    }

    #[test]
    fn test_single_shard() {
        let index: VersionedIndex<StopPlace> =
            VersionedIndex::with_config(IndexConfig { shard_count: 1 }).unwrap();
        index.put_all((0..50).map(|i| stop(&format!("S{}", i), "1")));

        assert_eq!(index.len(), 50);
        assert_eq!(index.stats().shard_count, 1);
    }

    #[test]
    fn test_invalid_config() {
        let result = VersionedIndex::<StopPlace>::with_config(IndexConfig { shard_count: 0 });
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_and_clear() {
        let index = new_index();
        index.put_all(vec![stop("A", "1"), stop("A", "2"), stop("B", "1")]);

        let stats = index.stats();
        assert_eq!(stats.id_count, 2);
        assert_eq!(stats.revision_count, 3);
        assert_eq!(stats.shard_count, 16);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.stats().revision_count, 0);
    }
}
