//! Identity registry
//!
//! Resolves free-text entity names (players, teams, venues) to stable numeric
//! ids that are valid over bounded time windows. Resolution is deterministic:
//! the same `(name, kind, date)` always yields the same id until an
//! intervening write, which makes re-ingestion idempotent.

pub mod errors;

mod entity;
mod resolver;

pub use entity::{Alias, Entity, EntityId, EntityKind};
pub use errors::{RegistryError, RegistryErrorCode, RegistryResult};
pub use resolver::IdentityRegistry;
