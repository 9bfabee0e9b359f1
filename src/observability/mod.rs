//! Observability
//!
//! Structured JSON logging with deterministic key ordering. Logging is
//! synchronous, read-only, and never affects execution; a log write failure
//! is swallowed rather than surfaced to the caller.

mod logger;

pub use logger::{Logger, Severity};
