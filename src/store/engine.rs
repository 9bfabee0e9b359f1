//! Storage engine
//!
//! State is one `RwLock`: reads (query execution) share it, writes
//! (ingestion, materialization) take it exclusively, which serializes them.
//! Every successful ingestion moves `snapshot_id`, so cache keys derived from
//! engine state can never alias across ingestions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::observability::Logger;
use crate::schema::{ball_event_v1, SchemaContract};
use crate::table::{Column, Table};

use super::errors::{StoreError, StoreResult};
use super::pool::ConnectionPool;
use super::query::{Aggregate, ColumnFilter, Predicate, StoreQuery};
use super::snapshot::{Snapshot, SnapshotManager};

/// Name of the raw event table.
pub const RAW_EVENTS: &str = "ball_events";

pub(crate) struct EngineState {
    pub(crate) tables: HashMap<String, Table>,
    pub(crate) snapshot_id: String,
    pub(crate) derived_versions: BTreeMap<String, String>,
}

pub(crate) struct EngineShared {
    pub(crate) state: RwLock<EngineState>,
    pub(crate) contract: SchemaContract,
}

/// The columnar store.
pub struct StorageEngine {
    shared: Arc<EngineShared>,
    pool: ConnectionPool,
    acquire_timeout: Option<Duration>,
    /// Persistent snapshot history; absent when no data dir is configured.
    snapshots: Option<Mutex<SnapshotManager>>,
}

impl StorageEngine {
    /// Opens an empty engine under the frozen v1 contract.
    pub fn new(config: &EngineConfig) -> Self {
        let shared = Arc::new(EngineShared {
            state: RwLock::new(EngineState {
                tables: HashMap::new(),
                snapshot_id: "initial_empty".to_string(),
                derived_versions: BTreeMap::new(),
            }),
            contract: ball_event_v1(),
        });
        let pool = ConnectionPool::new(Arc::clone(&shared), config.pool.clone());
        let snapshots = (!config.data_dir.as_os_str().is_empty())
            .then(|| Mutex::new(SnapshotManager::open(&config.data_dir)));
        Self {
            shared,
            pool,
            acquire_timeout: config
                .pool
                .acquire_timeout_ms
                .map(Duration::from_millis),
            snapshots,
        }
    }

    /// Ingests a canonicalized event table under a snapshot tag.
    ///
    /// The table must match the frozen contract exactly. With `append` an
    /// existing event table is extended; otherwise the active table is
    /// replaced. Either way the engine's snapshot id becomes `snapshot_tag`.
    pub fn ingest(&self, table: Table, snapshot_tag: &str, append: bool) -> StoreResult<()> {
        self.shared.contract.validate(&table)?;

        let mut state = self.shared.state.write().expect("engine state poisoned");
        let rows = table.num_rows();
        let merged = match state.tables.get(RAW_EVENTS) {
            Some(existing) if append => existing.concat(&table)?,
            _ => table,
        };
        let total = merged.num_rows();
        state.tables.insert(RAW_EVENTS.to_string(), merged);
        state.snapshot_id = snapshot_tag.to_string();
        drop(state);

        if let Some(manager) = &self.snapshots {
            let mut manager = manager.lock().expect("snapshot manager lock poisoned");
            // History persistence is observability, never fatal to ingest.
            if let Err(e) = manager.create_snapshot(
                snapshot_tag,
                &self.shared.contract.version,
                if append { "append" } else { "replace" },
            ) {
                Logger::warn(
                    "store.snapshot_persist_failed",
                    &[("snapshot", snapshot_tag), ("error", &e.to_string())],
                );
            }
        }

        Logger::info(
            "store.ingest",
            &[
                ("snapshot", snapshot_tag),
                ("rows", &rows.to_string()),
                ("total_rows", &total.to_string()),
                ("append", if append { "true" } else { "false" }),
            ],
        );
        Ok(())
    }

    /// Executes a typed query through the connection pool.
    pub fn execute(&self, query: &StoreQuery) -> StoreResult<Table> {
        self.execute_with_timeout(query, None)
    }

    /// Like `execute`, with a per-call acquisition timeout overriding the
    /// configured one.
    pub fn execute_with_timeout(
        &self,
        query: &StoreQuery,
        timeout: Option<Duration>,
    ) -> StoreResult<Table> {
        let conn = self.pool.acquire(timeout.or(self.acquire_timeout))?;
        conn.run(query)
    }

    /// Version of the frozen event contract.
    pub fn schema_version(&self) -> &str {
        &self.shared.contract.version
    }

    /// Whether a table (raw or materialized) is present.
    pub fn table_exists(&self, name: &str) -> bool {
        let state = self.shared.state.read().expect("engine state poisoned");
        state.tables.contains_key(name)
    }

    /// The current snapshot id.
    pub fn snapshot_id(&self) -> String {
        let state = self.shared.state.read().expect("engine state poisoned");
        state.snapshot_id.clone()
    }

    /// Versions of all materialized derived tables, for cache-key context.
    pub fn derived_versions(&self) -> BTreeMap<String, String> {
        let state = self.shared.state.read().expect("engine state poisoned");
        state.derived_versions.clone()
    }

    /// Names of the materialized tables the planner may target.
    pub fn materialized_catalogue(&self) -> BTreeSet<String> {
        let state = self.shared.state.read().expect("engine state poisoned");
        state.derived_versions.keys().cloned().collect()
    }

    /// Registers a materialized table under a version tag. Writes are
    /// serialized with ingestion by the same lock.
    pub fn register_materialized(
        &self,
        name: &str,
        table: Table,
        version: &str,
    ) -> StoreResult<()> {
        let mut state = self.shared.state.write().expect("engine state poisoned");
        state.tables.insert(name.to_string(), table);
        state
            .derived_versions
            .insert(name.to_string(), version.to_string());
        Ok(())
    }

    /// Pool statistics for observability: (idle, total).
    pub fn pool_stats(&self) -> (usize, usize) {
        self.pool.stats()
    }

    /// Persisted snapshot history, oldest first. Empty when the engine has
    /// no data directory.
    pub fn snapshot_history(&self) -> Vec<Snapshot> {
        match &self.snapshots {
            Some(manager) => manager
                .lock()
                .expect("snapshot manager lock poisoned")
                .snapshots()
                .to_vec(),
            None => Vec::new(),
        }
    }
}

/// Evaluates one typed query against the engine state. Runs under a shared
/// read lock held by the calling connection.
pub(crate) fn evaluate(state: &EngineState, query: &StoreQuery) -> StoreResult<Table> {
    let table = state
        .tables
        .get(&query.target)
        .ok_or_else(|| StoreError::TableNotFound(query.target.clone()))?;

    for filter in &query.filters {
        if table.column(&filter.column).is_none() {
            return Err(StoreError::ColumnNotFound {
                table: query.target.clone(),
                column: filter.column.clone(),
            });
        }
    }

    let rows: Vec<usize> = (0..table.num_rows())
        .filter(|&row| query.filters.iter().all(|f| row_matches(table, row, f)))
        .collect();

    if query.aggregates.is_empty() {
        project_rows(state, table, &rows, query)
    } else {
        aggregate_rows(table, &rows, query)
    }
}

fn row_matches(table: &Table, row: usize, filter: &ColumnFilter) -> bool {
    match &filter.predicate {
        Predicate::EqInt(v) => table.int_at(&filter.column, row) == Some(*v),
        Predicate::InInt(vs) => table
            .int_at(&filter.column, row)
            .map_or(false, |x| vs.contains(&x)),
        Predicate::EqStr(v) => table.str_at(&filter.column, row) == Some(v.as_str()),
        Predicate::InStr(vs) => table
            .str_at(&filter.column, row)
            .map_or(false, |x| vs.iter().any(|v| v == x)),
        Predicate::EqBool(v) => table.bool_at(&filter.column, row) == Some(*v),
    }
}

fn project_rows(
    state: &EngineState,
    table: &Table,
    rows: &[usize],
    query: &StoreQuery,
) -> StoreResult<Table> {
    let names: Vec<String> = match &query.projection {
        Some(cols) => cols.clone(),
        None => table.column_names().map(String::from).collect(),
    };

    let mut out: Vec<(String, Column)> = Vec::with_capacity(names.len());
    for name in &names {
        let column = table
            .column(name)
            .ok_or_else(|| StoreError::ColumnNotFound {
                table: query.target.clone(),
                column: name.clone(),
            })?;
        out.push((name.clone(), column.take(rows)));
    }

    // Left join: enrich each projected row with derived-table floats.
    if let Some(join) = &query.join {
        let derived = state
            .tables
            .get(&join.table)
            .ok_or_else(|| StoreError::TableNotFound(join.table.clone()))?;
        let mut index: HashMap<i64, usize> = HashMap::new();
        for row in 0..derived.num_rows() {
            if let Some(key) = derived.int_at(&join.on, row) {
                index.insert(key, row);
            }
        }
        for col_name in &join.columns {
            if derived.column(col_name).is_none() {
                return Err(StoreError::ColumnNotFound {
                    table: join.table.clone(),
                    column: col_name.clone(),
                });
            }
            let values: Vec<f64> = rows
                .iter()
                .map(|&row| {
                    table
                        .int_at(&join.on, row)
                        .and_then(|key| index.get(&key))
                        .and_then(|&derived_row| derived.float_at(col_name, derived_row))
                        .unwrap_or(f64::NAN)
                })
                .collect();
            out.push((col_name.clone(), Column::Float64(values)));
        }
    }

    Table::new(out).map_err(StoreError::SchemaViolation)
}

/// Group key cell: integers widened, strings owned. Ordered so that result
/// row order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyVal {
    Int(i64),
    Str(String),
}

fn aggregate_rows(table: &Table, rows: &[usize], query: &StoreQuery) -> StoreResult<Table> {
    for agg in &query.aggregates {
        if let Some(column) = agg.column() {
            if table.column(column).is_none() {
                return Err(StoreError::ColumnNotFound {
                    table: query.target.clone(),
                    column: column.to_string(),
                });
            }
        }
    }
    for key_col in &query.group_by {
        if table.column(key_col).is_none() {
            return Err(StoreError::ColumnNotFound {
                table: query.target.clone(),
                column: key_col.clone(),
            });
        }
    }

    let mut groups: BTreeMap<Vec<KeyVal>, Vec<usize>> = BTreeMap::new();
    for &row in rows {
        let key: Vec<KeyVal> = query
            .group_by
            .iter()
            .map(|col| match table.int_at(col, row) {
                Some(i) => KeyVal::Int(i),
                None => KeyVal::Str(table.str_at(col, row).unwrap_or("").to_string()),
            })
            .collect();
        groups.entry(key).or_default().push(row);
    }
    // Global aggregation still yields one row for zero matches.
    if query.group_by.is_empty() && groups.is_empty() {
        groups.insert(Vec::new(), Vec::new());
    }

    let mut key_columns: Vec<Vec<KeyVal>> = vec![Vec::new(); query.group_by.len()];
    let mut agg_columns: Vec<Vec<i64>> = vec![Vec::new(); query.aggregates.len()];

    for (key, group_rows) in &groups {
        for (slot, cell) in key.iter().enumerate() {
            key_columns[slot].push(cell.clone());
        }
        for (slot, agg) in query.aggregates.iter().enumerate() {
            let value = match agg {
                Aggregate::SumInt { column, .. } => group_rows
                    .iter()
                    .filter_map(|&row| table.int_at(column, row))
                    .sum(),
                Aggregate::CountRows { .. } => group_rows.len() as i64,
                Aggregate::CountTrue { column, .. } => group_rows
                    .iter()
                    .filter(|&&row| table.bool_at(column, row) == Some(true))
                    .count() as i64,
            };
            agg_columns[slot].push(value);
        }
    }

    let mut out: Vec<(String, Column)> = Vec::new();
    for (slot, name) in query.group_by.iter().enumerate() {
        let cells = &key_columns[slot];
        let column = if cells.iter().all(|c| matches!(c, KeyVal::Int(_))) {
            Column::Int64(
                cells
                    .iter()
                    .map(|c| match c {
                        KeyVal::Int(i) => *i,
                        KeyVal::Str(_) => unreachable!(),
                    })
                    .collect(),
            )
        } else {
            // Group keys are unbounded (one per distinct match id, say), so
            // string keys come out as plain Utf8 rather than dictionary codes.
            Column::Utf8(
                cells
                    .iter()
                    .map(|c| match c {
                        KeyVal::Int(i) => i.to_string(),
                        KeyVal::Str(s) => s.clone(),
                    })
                    .collect(),
            )
        };
        out.push((name.clone(), column));
    }
    for (slot, agg) in query.aggregates.iter().enumerate() {
        out.push((
            agg.alias().to_string(),
            Column::Int64(std::mem::take(&mut agg_columns[slot])),
        ));
    }

    Table::new(out).map_err(StoreError::SchemaViolation)
}
