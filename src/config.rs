use crate::{Error, Result};

/// The shard count used when none, or an invalid one, is given.
pub const DEFAULT_SHARD_COUNT: usize = 32;

/// Construction-time settings for a `SyncMap`.
///
/// # Examples
/// ```
/// use syncmap::{Config, SyncMap};
///
/// let config = Config::default().shard_count(64).capacity(1024).seed(7);
/// let map = SyncMap::<u64, u32>::from_config(config).unwrap();
/// assert_eq!(map.shard_count(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Number of shards; must be a power of two.
    pub shard_count: usize,
    /// Initial capacity of the whole map, split evenly across shards.
    pub capacity: usize,
    /// Seed for the random source used by `pop`. `None` uses the thread-local generator.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            capacity: 0,
            seed: None,
        }
    }
}

impl Config {
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the shard count is a power of two.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count.is_power_of_two() {
            Ok(())
        } else {
            Err(Error::InvalidShardCount(self.shard_count))
        }
    }

    /// Replaces an invalid shard count with `DEFAULT_SHARD_COUNT`.
    pub(crate) fn or_default_shard_count(mut self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!(
                requested = self.shard_count,
                fallback = DEFAULT_SHARD_COUNT,
                "{err}, using the default shard count"
            );
            self.shard_count = DEFAULT_SHARD_COUNT;
        }
        self
    }
}
