use crate::{Config, Error, Iter, Keys, Result, Shard, ShardKey, ShardRouter};
use foldhash::fast::FixedState;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::BuildHasher;

/// Source of shard indices for `SyncMap::pop`.
enum PopRng {
    Thread,
    Seeded(Mutex<StdRng>),
}

impl PopRng {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
            None => Self::Thread,
        }
    }

    fn index(&self, n: usize) -> usize {
        match self {
            Self::Thread => rand::thread_rng().gen_range(0..n),
            Self::Seeded(rng) => rng.lock().gen_range(0..n),
        }
    }
}

/// A thread-safe map that spreads its keys over independently locked shards.
///
/// Every key is routed to exactly one shard; operations on different shards never block
/// each other. Aggregate operations (`len`, `flush`, `keys`, `iter`) lock one shard at a
/// time and are not atomic across the whole map.
pub struct SyncMap<K, V, S = FixedState> {
    router: ShardRouter<S>,
    shards: Vec<Shard<K, V>>,
    rng: PopRng,
}

/// A `SyncMap` keyed by `u32`.
pub type SyncMap32<V> = SyncMap<u32, V>;

/// A `SyncMap` keyed by `u64`.
pub type SyncMap64<V> = SyncMap<u64, V>;

impl<K: ShardKey, V> Default for SyncMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ShardKey, V> SyncMap<K, V> {
    /// Creates a new `SyncMap` with `DEFAULT_SHARD_COUNT` shards.
    ///
    /// # Examples
    /// ```
    /// use syncmap::{SyncMap, DEFAULT_SHARD_COUNT};
    ///
    /// let map = SyncMap::<u32, &str>::new();
    /// assert_eq!(map.shard_count(), DEFAULT_SHARD_COUNT);
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::build(Config::default(), FixedState::default())
    }

    /// Creates a new `SyncMap` with the given number of shards.
    ///
    /// If `shard_count` is not a power of two, a warning is logged and
    /// `DEFAULT_SHARD_COUNT` is used instead. Use `from_config` to get an error.
    ///
    /// # Examples
    /// ```
    /// use syncmap::{SyncMap, DEFAULT_SHARD_COUNT};
    ///
    /// assert_eq!(SyncMap::<u64, u8>::with_shard_count(64).shard_count(), 64);
    /// assert_eq!(SyncMap::<u64, u8>::with_shard_count(5).shard_count(), DEFAULT_SHARD_COUNT);
    /// ```
    pub fn with_shard_count(shard_count: usize) -> Self {
        Self::with_capacity_and_shard_count(0, shard_count)
    }

    /// Creates a new `SyncMap` with the specified initial capacity and number of shards.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The initial capacity of the whole map, split evenly across shards.
    /// * `shard_count` - The number of shards, falling back to `DEFAULT_SHARD_COUNT` if it
    ///   is not a power of two.
    pub fn with_capacity_and_shard_count(capacity: usize, shard_count: usize) -> Self {
        let config = Config::default()
            .capacity(capacity)
            .shard_count(shard_count)
            .or_default_shard_count();
        Self::build(config, FixedState::default())
    }

    /// Creates a new `SyncMap` from `config`, rejecting an invalid shard count.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidShardCount` if the shard count is not a power of two.
    pub fn from_config(config: Config) -> Result<Self> {
        Self::with_hasher(config, FixedState::default())
    }
}

impl<K: ShardKey, V, S: BuildHasher> SyncMap<K, V, S> {
    /// Creates a new `SyncMap` from `config` that routes keys with `hasher`.
    ///
    /// # Examples
    /// ```
    /// use syncmap::{BkdrState, Config, SyncMap};
    ///
    /// let map = SyncMap::<u64, u32, _>::with_hasher(Config::default(), BkdrState).unwrap();
    /// map.set(1, 1);
    /// assert_eq!(map.get(&1), Some(1));
    /// ```
    pub fn with_hasher(config: Config, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: Config, hasher: S) -> Self {
        let shard_capacity = config.capacity / config.shard_count;
        Self {
            router: ShardRouter::new(config.shard_count, hasher),
            shards: (0..config.shard_count)
                .map(|_| Shard::with_capacity(shard_capacity))
                .collect::<Vec<_>>(),
            rng: PopRng::new(config.seed),
        }
    }

    /// Returns the number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline(always)]
    fn shard(&self, key: &K) -> &Shard<K, V> {
        &self.shards[self.router.locate(key)]
    }

    /// Gets a clone of the value associated with `key`, or `None` if it is missing.
    ///
    /// # Examples
    /// ```
    /// use syncmap::SyncMap;
    ///
    /// let map = SyncMap::<u32, u32>::new();
    /// map.set(1, 42);
    /// assert_eq!(map.get(&1), Some(42));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard(key).get(key)
    }

    /// Inserts or overwrites `key`.
    pub fn set(&self, key: K, value: V) {
        self.insert(key, value);
    }

    /// Inserts or overwrites `key`, returning the replaced value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.shard(&key).insert(key, value)
    }

    /// Removes `key` if present.
    pub fn delete(&self, key: &K) {
        self.remove(key);
    }

    /// Removes `key` if present, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).remove(key)
    }

    /// Returns `true` if the map contains `key`.
    pub fn has(&self, key: &K) -> bool {
        self.shard(key).contains(key)
    }

    /// Returns the number of items, summed shard by shard.
    ///
    /// Under concurrent writes this is a best-effort figure that may never have been exact
    /// at any single instant.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Returns `true` if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Clears every shard in order and returns the number of items removed.
    ///
    /// A concurrent `set` that lands in a shard not yet cleared is removed; one that lands
    /// in a shard already cleared survives.
    pub fn flush(&self) -> usize {
        let removed: usize = self.shards.iter().map(|s| s.flush()).sum();
        tracing::debug!(removed, shards = self.shards.len(), "flushed map");
        removed
    }

    /// Removes and returns an arbitrary item.
    ///
    /// Shards are picked uniformly at random until one yields an item.
    ///
    /// # Errors
    ///
    /// Returns `Error::Empty` if the map is empty, including when it is drained by other
    /// threads while this call is searching.
    ///
    /// # Examples
    /// ```
    /// use syncmap::{Error, SyncMap};
    ///
    /// let map = SyncMap::<u32, u32>::new();
    /// assert_eq!(map.pop(), Err(Error::Empty));
    /// map.set(1, 1);
    /// assert_eq!(map.pop(), Ok((1, 1)));
    /// assert!(map.is_empty());
    /// ```
    pub fn pop(&self) -> Result<(K, V)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let n = self.shards.len();
        let mut misses = 0usize;
        loop {
            let idx = self.rng.index(n);
            if let Some(item) = self.shards[idx].pop_any() {
                return Ok(item);
            }
            misses += 1;
            if misses % n == 0 && self.is_empty() {
                return Err(Error::Empty);
            }
        }
    }

    /// Returns a lazy iterator over all keys, shard by shard.
    ///
    /// **Locking behaviour:** The shard being traversed stays read-locked until its last key
    /// is yielded or the iterator is dropped. Writing to that shard from the consuming thread
    /// in the meantime deadlocks.
    ///
    /// # Examples
    /// ```
    /// use syncmap::SyncMap;
    ///
    /// let map = SyncMap::<u32, ()>::new();
    /// for key in 0..10 {
    ///     map.set(key, ());
    /// }
    /// let mut keys = map.keys().collect::<Vec<_>>();
    /// keys.sort();
    /// assert_eq!(keys, (0..10).collect::<Vec<_>>());
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(&self.shards)
    }

    /// Returns a lazy iterator over all `(key, value)` pairs, shard by shard.
    ///
    /// **Locking behaviour:** Same as `keys`.
    pub fn iter(&self) -> Iter<'_, K, V>
    where
        V: Clone,
    {
        Iter::new(&self.shards)
    }
}
