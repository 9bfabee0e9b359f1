//! Cost-based query planning
//!
//! The planner maps an intent onto a concrete store target: a cheap
//! materialized table when one is in the catalogue, otherwise a raw event
//! scan. Plans are pure data and carry a coarse cost tag so callers can
//! reason about what they are about to run.

mod errors;
#[allow(clippy::module_inception)]
mod planner;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use planner::{Cost, ExecutionPlan, QueryPlanner, Strategy, PLANNER_VERSION};
