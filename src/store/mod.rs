//! Columnar store
//!
//! Holds the active event table and derived/materialized aggregates, tracks
//! the current snapshot id, and executes typed queries. Reads run
//! concurrently through a connection pool; writes (ingestion,
//! materialization) are serialized by the engine's write lock.

pub mod errors;

mod derived;
mod engine;
mod pool;
mod query;
mod snapshot;

pub use derived::{DerivedStore, DerivedTable};
pub use engine::{StorageEngine, RAW_EVENTS};
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use pool::{ConnectionPool, PooledConnection};
pub use query::{Aggregate, ColumnFilter, DerivedJoin, Predicate, StoreQuery};
pub use snapshot::{Snapshot, SnapshotManager};
