//! Derived-table materialization
//!
//! Derived tables are precomputed aggregates the planner prefers over raw
//! scans. Each one the core can build is a variant of `DerivedTable`, so a
//! query intent can only declare dependencies the store actually knows how
//! to materialize.

use std::collections::BTreeMap;

use crate::table::{Column, Table};

use super::engine::{StorageEngine, RAW_EVENTS};
use super::errors::StoreResult;

/// Derived tables the store can materialize on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedTable {
    /// Per-venue scoring baseline: `(venue_id, venue_avg_sr)` where the
    /// average strike rate is runs per ball times 100.
    VenueBaselines,
}

impl DerivedTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            DerivedTable::VenueBaselines => "venue_baselines",
        }
    }

    /// Version tag recorded in the engine catalogue; bumping it invalidates
    /// every cache key whose context includes this table.
    pub fn version(&self) -> &'static str {
        match self {
            DerivedTable::VenueBaselines => "v1",
        }
    }
}

/// Builds and registers derived tables in the engine.
pub struct DerivedStore<'a> {
    engine: &'a StorageEngine,
}

impl<'a> DerivedStore<'a> {
    pub fn new(engine: &'a StorageEngine) -> Self {
        Self { engine }
    }

    /// Ensures the derived table is materialized, computing and persisting
    /// it from the current event table when absent.
    pub fn ensure_materialized(&self, table: DerivedTable) -> StoreResult<()> {
        if self.engine.table_exists(table.table_name()) {
            return Ok(());
        }
        match table {
            DerivedTable::VenueBaselines => self.build_venue_baselines(),
        }
    }

    fn build_venue_baselines(&self) -> StoreResult<()> {
        let events = self
            .engine
            .execute(&super::query::StoreQuery::scan(RAW_EVENTS))?;

        // (total runs, balls) per venue, in venue-id order.
        let mut totals: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for row in 0..events.num_rows() {
            let venue = events.int_at("venue_id", row).unwrap_or(0);
            let runs = events.int_at("runs_batter", row).unwrap_or(0)
                + events.int_at("runs_extras", row).unwrap_or(0);
            let entry = totals.entry(venue).or_insert((0, 0));
            entry.0 += runs;
            entry.1 += 1;
        }

        let mut venue_ids = Vec::with_capacity(totals.len());
        let mut avg_sr = Vec::with_capacity(totals.len());
        for (venue, (runs, balls)) in totals {
            venue_ids.push(venue as i32);
            avg_sr.push(if balls == 0 {
                0.0
            } else {
                (runs as f64 / balls as f64) * 100.0
            });
        }

        let table = Table::new(vec![
            ("venue_id".into(), Column::Int32(venue_ids)),
            ("venue_avg_sr".into(), Column::Float64(avg_sr)),
        ])?;
        self.engine.register_materialized(
            DerivedTable::VenueBaselines.table_name(),
            table,
            DerivedTable::VenueBaselines.version(),
        )
    }
}
