use crate::shard::{Shard, ShardItems};
use parking_lot::RwLockReadGuard;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::{slice, vec};

/// Walks the shards in order, one read lock at a time.
struct ShardCursor<'a, K, V, T> {
    shards: slice::Iter<'a, Shard<K, V>>,
    // Held until the last item of `pending` is yielded; writers to the current shard wait
    // for the consumer.
    guard: Option<RwLockReadGuard<'a, ShardItems<K, V>>>,
    pending: vec::IntoIter<T>,
    project: fn(&K, &V) -> T,
}

impl<'a, K: Eq + Hash, V, T> ShardCursor<'a, K, V, T> {
    fn new(shards: &'a [Shard<K, V>], project: fn(&K, &V) -> T) -> Self {
        Self {
            shards: shards.iter(),
            guard: None,
            pending: Vec::new().into_iter(),
            project,
        }
    }
}

impl<K: Eq + Hash, V, T> Iterator for ShardCursor<'_, K, V, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.pending.next() {
                if self.pending.len() == 0 {
                    self.guard = None;
                }
                return Some(item);
            }
            self.guard = None;
            let shard = self.shards.next()?;
            let guard = shard.read();
            let project = self.project;
            self.pending = guard
                .iter()
                .map(|(k, v)| project(k, v))
                .collect::<Vec<_>>()
                .into_iter();
            self.guard = Some(guard);
        }
    }
}

impl<K: Eq + Hash, V, T> FusedIterator for ShardCursor<'_, K, V, T> {}

/// A lazy iterator over the keys of a `SyncMap`, created by `SyncMap::keys`.
///
/// Shards are visited in order. Each shard's read lock is taken when the traversal reaches
/// it and released once its last key has been yielded, or when the iterator is dropped.
pub struct Keys<'a, K, V>(ShardCursor<'a, K, V, K>);

impl<'a, K: Eq + Hash + Copy, V> Keys<'a, K, V> {
    pub(crate) fn new(shards: &'a [Shard<K, V>]) -> Self {
        Self(ShardCursor::new(shards, |k, _| *k))
    }
}

impl<K: Eq + Hash, V> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.0.next()
    }
}

impl<K: Eq + Hash, V> FusedIterator for Keys<'_, K, V> {}

/// A lazy iterator over the `(key, value)` pairs of a `SyncMap`, created by `SyncMap::iter`.
///
/// Locking follows `Keys`. Values are cloned out of the shard.
pub struct Iter<'a, K, V>(ShardCursor<'a, K, V, (K, V)>);

impl<'a, K: Eq + Hash + Copy, V: Clone> Iter<'a, K, V> {
    pub(crate) fn new(shards: &'a [Shard<K, V>]) -> Self {
        Self(ShardCursor::new(shards, |k, v| (*k, v.clone())))
    }
}

impl<K: Eq + Hash, V> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.0.next()
    }
}

impl<K: Eq + Hash, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn shards(count: usize, keys: u32) -> Vec<Shard<u32, u32>> {
        let shards = (0..count)
            .map(|_| Shard::with_capacity(0))
            .collect::<Vec<_>>();
        for key in 0..keys {
            shards[key as usize % count].insert(key, key * 10);
        }
        shards
    }

    #[test]
    fn test_keys_visit_shards_in_order() {
        let shards = shards(4, 20);
        let keys = Keys::new(&shards).collect::<Vec<_>>();
        assert_eq!(keys.len(), 20);
        let owners = keys.iter().map(|k| k % 4).collect::<Vec<_>>();
        let mut sorted = owners.clone();
        sorted.sort();
        assert_eq!(owners, sorted);
    }

    #[test]
    fn test_iter_items() {
        let shards = shards(2, 10);
        let mut items = Iter::new(&shards).collect::<Vec<_>>();
        items.sort();
        assert_eq!(items, (0..10).map(|k| (k, k * 10)).collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_empty_and_fused() {
        let shards = shards(3, 0);
        let mut keys = Keys::new(&shards);
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next(), None);

        let none: Vec<Shard<u32, u32>> = Vec::new();
        assert_eq!(Iter::new(&none).count(), 0);
    }

    #[test]
    fn test_iter_releases_lock_on_drop() {
        let shards = shards(1, 5);
        {
            let mut keys = Keys::new(&shards);
            assert!(keys.next().is_some());
        }
        // would deadlock if the read guard outlived the iterator
        shards[0].insert(100, 1000);
        assert_eq!(shards[0].len(), 6);
    }

    #[test]
    fn test_iter_releases_lock_after_last_key() {
        let shards = shards(1, 1);
        let mut keys = Keys::new(&shards);
        assert_eq!(keys.next(), Some(0));
        // the iterator is still alive, but the shard has no keys left to yield
        shards[0].insert(1, 10);
        shards[0].remove(&0);
        assert_eq!(keys.next(), None);
        assert_eq!(shards[0].len(), 1);
    }

    #[test]
    fn test_iter_releases_lock_after_shard() {
        let shards = shards(2, 2);
        let mut keys = Keys::new(&shards);
        assert_eq!(keys.next(), Some(0));
        // the cursor has moved on from shard 0 once shard 1 is being read
        assert_eq!(keys.next(), Some(1));
        shards[0].insert(2, 20);
        assert_eq!(keys.next(), None);
        assert_eq!(shards[0].len(), 2);
    }
}
