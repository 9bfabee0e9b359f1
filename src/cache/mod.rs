//! Result cache
//!
//! Keyed by the deterministic query hash, so correctness never depends on
//! eviction: any state change produces a new key and old entries simply age
//! out. `get` is best-effort; an expired, missing, or corrupt entry is a
//! miss, never an error. `set` surfaces IO and codec failures so callers can
//! log them, but a failed write only costs a future recomputation.

mod codec;
mod errors;
mod file;
mod memory;
mod value;

pub use errors::{CacheError, CacheResult};
pub use file::FileCache;
pub use memory::MemoryCache;
pub use value::CachedValue;

use std::time::Duration;

/// TTL cache keyed by query hash.
pub trait QueryCache: Send + Sync {
    /// Returns the live value for a key, or `None` on miss or expiry.
    fn get(&self, key: &str) -> Option<CachedValue>;

    /// Stores a value under a key. Last write wins.
    fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()>;

    /// Drops every entry.
    fn clear(&self) -> CacheResult<()>;
}
