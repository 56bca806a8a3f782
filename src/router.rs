use foldhash::fast::FixedState;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash, Hasher};

mod private {
    pub trait Sealed {}
}

/// Key types accepted by `SyncMap`: fixed-width unsigned integers.
///
/// The trait is sealed; one generic container serves every width.
pub trait ShardKey: private::Sealed + Copy + Eq + Hash + Debug + Send + Sync + 'static {}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(
            impl private::Sealed for $t {}
            impl ShardKey for $t {}
        )*
    };
}

impl_shard_key!(u8, u16, u32, u64, u128, usize);

const BKDR_SEED: u32 = 131;

/// BKDR string hash over the canonical decimal form of an integer key.
///
/// Byte slices are hashed as-is; integers are rendered as decimal digits first, so
/// `1u32` and `1u64` hash identically.
#[derive(Debug, Default, Clone, Copy)]
pub struct BkdrHasher {
    hash: u32,
}

impl BkdrHasher {
    fn write_decimal(&mut self, mut n: u128) {
        // u128::MAX has 39 digits.
        let mut buf = [0u8; 39];
        let mut pos = buf.len();
        loop {
            pos -= 1;
            buf[pos] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.write(&buf[pos..]);
    }
}

impl Hasher for BkdrHasher {
    fn finish(&self) -> u64 {
        self.hash as u64
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = self.hash.wrapping_mul(BKDR_SEED).wrapping_add(b as u32);
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.write_decimal(i as u128);
    }

    fn write_u16(&mut self, i: u16) {
        self.write_decimal(i as u128);
    }

    fn write_u32(&mut self, i: u32) {
        self.write_decimal(i as u128);
    }

    fn write_u64(&mut self, i: u64) {
        self.write_decimal(i as u128);
    }

    fn write_u128(&mut self, i: u128) {
        self.write_decimal(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.write_decimal(i as u128);
    }
}

/// `BuildHasher` producing `BkdrHasher`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct BkdrState;

impl BuildHasher for BkdrState {
    type Hasher = BkdrHasher;

    fn build_hasher(&self) -> BkdrHasher {
        BkdrHasher::default()
    }
}

/// Maps keys to shard indices with `hash & (shard_count - 1)`.
///
/// The routing is a pure function of the hasher, the shard count and the key. The shard
/// count must be a power of two; callers validate it before building a router.
#[derive(Debug, Clone)]
pub struct ShardRouter<S = FixedState> {
    mask: usize,
    hasher: S,
}

impl<S: BuildHasher> ShardRouter<S> {
    pub fn new(shard_count: usize, hasher: S) -> Self {
        debug_assert!(
            shard_count.is_power_of_two(),
            "shard count {shard_count} is not a power of two"
        );
        Self {
            mask: shard_count - 1,
            hasher,
        }
    }

    /// Returns the index of the shard owning `key`, in `[0, shard_count)`.
    #[inline(always)]
    pub fn locate<K: Hash + ?Sized>(&self, key: &K) -> usize {
        self.hasher.hash_one(key) as usize & self.mask
    }

    pub fn shard_count(&self) -> usize {
        self.mask + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bkdr_decimal() {
        let state = BkdrState;
        assert_eq!(state.hash_one(1u32), 49);
        assert_eq!(state.hash_one(12u32), 49 * 131 + 50);
        assert_eq!(state.hash_one(12u32), state.hash_one(12u64));
        assert_eq!(state.hash_one(0u8), b'0' as u64);
        // wraps at 32 bits
        assert!(state.hash_one(u128::MAX) <= u32::MAX as u64);
    }

    #[test]
    fn test_router_bkdr() {
        let router = ShardRouter::new(32, BkdrState);
        assert_eq!(router.shard_count(), 32);
        assert_eq!(router.locate(&1u64), 17);
        assert_eq!(router.locate(&12u64), 5);
        assert_eq!(router.locate(&12u32), router.locate(&12u64));

        let single = ShardRouter::new(1, BkdrState);
        for key in 0..1000u32 {
            assert_eq!(single.locate(&key), 0);
        }
    }

    #[test]
    fn test_router_deterministic() {
        let a = ShardRouter::new(64, FixedState::default());
        let b = ShardRouter::new(64, FixedState::default());
        for key in 0..1000u64 {
            let idx = a.locate(&key);
            assert!(idx < 64);
            assert_eq!(idx, a.locate(&key));
            assert_eq!(idx, b.locate(&key));
        }
    }

    #[test]
    fn test_router_distribution() {
        const SHARDS: usize = 32;
        const KEYS: u64 = 10_000;
        let router = ShardRouter::new(SHARDS, FixedState::default());
        let mut counts = [0usize; SHARDS];
        for key in 0..KEYS {
            counts[router.locate(&key)] += 1;
        }
        for count in counts {
            assert!((150..500).contains(&count), "unbalanced shard: {count}");
        }
    }
}
