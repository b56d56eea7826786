//! Caching primitives for the resolution core.
//!
//! - [`KeyedLru`]: string-keyed, capacity-bounded, mutex-guarded LRU map
//! - [`KeyedLocks`]: one async lock per key, used to make sure only one
//!   caller fetches a given identifier at a time

mod keyed_locks;
mod lru_cache;

pub use keyed_locks::{KeyGuard, KeyedLocks};
pub use lru_cache::{CacheError, KeyedLru};
