//! Frozen event-schema contract
//!
//! The ball-event schema is a frozen contract: downstream consumers depend on
//! exact column names, order and types, and cache keys embed the contract
//! version. Any change here is a breaking change requiring a version bump.

pub mod errors;

mod contract;

pub use contract::{ball_event_v1, ColumnDef, ColumnType, SchemaContract};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
