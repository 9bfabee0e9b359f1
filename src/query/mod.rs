//! Query intents and cache-key derivation
//!
//! A query is a typed intent plus an execution context. The intent carries
//! only semantics (who, where, which phases, which mode); knobs that cannot
//! change a result, like timeouts and verbosity, live in `ExecutionOptions`
//! and never reach the cache key.

mod context;
mod hashing;
mod intent;

pub use context::QueryContext;
pub use hashing::cache_key;
pub use intent::{
    ExecutionMode, ExecutionOptions, FantasyIntent, Granularity, MatchupIntent, QueryIntent,
    Requires, WinProbIntent,
};
