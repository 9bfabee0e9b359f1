//! pitchdb - a strict, deterministic cricket analytics engine
//!
//! Ball-by-ball events flow through identity resolution and canonicalization
//! into a frozen columnar contract; typed query intents hash deterministically
//! into cache keys, get planned against materialized aggregates or raw scans,
//! and execute through a cache-backed loop.

pub mod cache;
pub mod canonical;
pub mod config;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod query;
pub mod registry;
pub mod schema;
pub mod store;
pub mod table;
