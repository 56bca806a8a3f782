use foldhash::fast::RandomState;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::hash::Hash;

pub(crate) type ShardItems<K, V> = HashMap<K, V, RandomState>;

/// A thread-safe partition of the map.
///
/// This struct wraps a `HashMap` protected by a reader/writer lock. Lookups take the read
/// lock, mutations take the write lock, and every lock is released before returning.
pub struct Shard<K, V> {
    /// The underlying hashmap protected by a `RwLock`.
    items: RwLock<ShardItems<K, V>>,
}

impl<K, V> Shard<K, V>
where
    K: Eq + Hash,
{
    /// Creates a new empty `Shard` with the specified initial capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The initial capacity of the hashmap.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::default(),
            )),
        }
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.items.read().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.read().contains_key(key)
    }

    /// Inserts or overwrites `key`, returning the replaced value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.items.write().insert(key, value)
    }

    /// Removes `key` if present, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.items.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Replaces the items with a fresh, empty container and returns how many items were
    /// dropped.
    ///
    /// The old container is released after the write lock, so dropping large values does
    /// not stall other threads waiting on this shard.
    pub fn flush(&self) -> usize {
        let old = {
            let mut items = self.items.write();
            std::mem::replace(
                &mut *items,
                HashMap::with_hasher(RandomState::default()),
            )
        };
        old.len()
    }

    /// Removes and returns an arbitrary item, or `None` if the shard is empty.
    ///
    /// The item is the first one in the underlying map's iteration order; no ordering is
    /// guaranteed.
    pub fn pop_any(&self) -> Option<(K, V)>
    where
        K: Copy,
    {
        let mut items = self.items.write();
        let key = *items.keys().next()?;
        items.remove_entry(&key)
    }

    /// Acquires the read lock for a traversal of this shard.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ShardItems<K, V>> {
        self.items.read()
    }
}
