//! A thread-safe map for unsigned integer keys that shards its key space across
//! independent reader/writer locks.
//!
//! # Overview
//! `syncmap` splits its items over a fixed, power-of-two number of shards. Each key is routed
//! to exactly one shard with `hash & (shard_count - 1)`, and each shard is guarded by its own
//! `RwLock`, so threads working on different shards never contend.
//!
//! # Features
//! - Point operations lock a single shard: read lock for lookups, write lock for mutations
//! - One generic container for `u8` through `u128` keys
//! - Random eviction with `pop`, seedable for reproducible tests
//! - Lazy iteration that read-locks one shard at a time
//! - No poisoning, locks are released normally on panic
//!
//! Aggregate operations (`len`, `flush`, `keys`, `iter`) visit the shards one after another
//! and are not atomic across the map.
//!
//! # Examples
//! ```
//! use syncmap::{Error, SyncMap};
//!
//! let map = SyncMap::<u64, String>::new();
//!
//! // Basic operations
//! map.set(1, "one".into());
//! assert_eq!(map.get(&1).as_deref(), Some("one"));
//! assert!(map.has(&1));
//! assert_eq!(map.len(), 1);
//!
//! // Remove an arbitrary item
//! assert_eq!(map.pop(), Ok((1, "one".into())));
//! assert_eq!(map.pop(), Err(Error::Empty));
//!
//! // Clear everything
//! map.set(2, "two".into());
//! assert_eq!(map.flush(), 1);
//! ```
mod config;
mod error;
mod iter;
mod router;
mod shard;
mod syncmap;

pub use config::*;
pub use error::*;
pub use iter::*;
pub use router::*;
use shard::Shard;
pub use syncmap::*;
