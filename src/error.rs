/// Errors reported by `SyncMap`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested shard count is zero or not a power of two.
    #[error("shard count {0} is not a power of two")]
    InvalidShardCount(usize),
    /// The map holds no items.
    #[error("map is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, Error>;
