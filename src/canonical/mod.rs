//! Canonicalization pipeline
//!
//! Transforms heterogeneous raw match documents into the strict v1 ball-event
//! table. Deliveries are processed in document order (inning → over → ball),
//! names are resolved through the identity registry with auto-ingestion, and
//! the built table is validated against the frozen contract before it can
//! reach storage.

pub mod errors;

mod canonicalizer;
mod phase;
mod raw;
mod runs;

pub use canonicalizer::{canonicalize_match, CanonicalMatch, CanonicalReport};
pub use errors::{CanonicalError, CanonicalResult};
pub use phase::Phase;
pub use raw::{RawDelivery, RawExtras, RawInfo, RawInnings, RawMatch, RawOver, RawRuns, RawWicket};
pub use runs::RunComponent;
