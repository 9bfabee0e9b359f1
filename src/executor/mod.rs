//! Cache-backed query execution
//!
//! The executor owns the hash-check-plan-execute-cache loop. Every
//! collaborator arrives through the constructor, so two executors over the
//! same engine and cache behave identically and tests can swap any piece.

mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod result;

pub use errors::{ExecutorError, ExecutorResult, FailureCause};
pub use executor::RuntimeExecutor;
pub use result::{ExecutionResult, ResultMetadata, ResultSource};
