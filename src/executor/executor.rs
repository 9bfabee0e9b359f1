//! The execution loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::cache::{CachedValue, QueryCache};
use crate::observability::Logger;
use crate::planner::{QueryPlanner, PLANNER_VERSION};
use crate::query::{cache_key, ExecutionOptions, QueryContext, QueryIntent};
use crate::store::{DerivedStore, StorageEngine};

use super::errors::{ExecutorError, ExecutorResult};
use super::result::{ExecutionResult, ResultMetadata, ResultSource};

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Executes intents against the engine, consulting the cache first.
pub struct RuntimeExecutor {
    engine: Arc<StorageEngine>,
    cache: Arc<dyn QueryCache>,
    default_ttl: Duration,
}

impl RuntimeExecutor {
    pub fn new(engine: Arc<StorageEngine>, cache: Arc<dyn QueryCache>, default_ttl: Duration) -> Self {
        Self {
            engine,
            cache,
            default_ttl,
        }
    }

    /// Runs one intent: hash, cache check, plan, execute, cache the result.
    ///
    /// Only successful results are cached; a failure leaves the cache
    /// untouched so the next call recomputes.
    pub fn execute(
        &self,
        intent: &QueryIntent,
        options: &ExecutionOptions,
    ) -> ExecutorResult<ExecutionResult> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let context = self.current_context();
        let key = cache_key(intent, &context);

        if let Some(data) = self.cache.get(&key) {
            Logger::info(
                "executor.cache_hit",
                &[
                    ("kind", intent.kind_name()),
                    ("query_hash", &key),
                    ("request_id", &request_id),
                ],
            );
            return Ok(ExecutionResult {
                data,
                meta: self.metadata(&key, &context, started, ResultSource::Cache),
            });
        }

        let catalogue = self.engine.materialized_catalogue();
        let plan = QueryPlanner::plan(intent, &catalogue);
        if options.verbose {
            Logger::trace(
                "executor.plan",
                &[
                    ("cost", &format!("{:?}", plan.cost)),
                    ("request_id", &request_id),
                    ("target", &plan.target_table),
                ],
            );
        }

        let derived = DerivedStore::new(&self.engine);
        for dependency in QueryPlanner::dependencies(intent, &plan) {
            derived
                .ensure_materialized(dependency)
                .map_err(|e| ExecutorError::failed(&key, e))?;
        }

        let query =
            QueryPlanner::build_query(intent, &plan).map_err(|e| ExecutorError::failed(&key, e))?;
        let table = self
            .engine
            .execute_with_timeout(&query, options.timeout)
            .map_err(|e| ExecutorError::failed(&key, e))?;
        let data = CachedValue::Table(table);

        self.cache
            .set(&key, data.clone(), self.default_ttl)
            .map_err(|e| ExecutorError::failed(&key, e))?;
        Logger::info(
            "executor.computed",
            &[
                ("kind", intent.kind_name()),
                ("query_hash", &key),
                ("request_id", &request_id),
                ("rows", &data.row_count().to_string()),
            ],
        );

        Ok(ExecutionResult {
            data,
            meta: self.metadata(&key, &context, started, ResultSource::Compute),
        })
    }

    /// The context a key is derived under, read from live engine state.
    pub fn current_context(&self) -> QueryContext {
        QueryContext {
            schema_version: self.engine.schema_version().to_string(),
            snapshot_id: self.engine.snapshot_id(),
            planner_version: PLANNER_VERSION.to_string(),
            derived_versions: self.engine.derived_versions(),
        }
    }

    fn metadata(
        &self,
        key: &str,
        context: &QueryContext,
        started: Instant,
        source: ResultSource,
    ) -> ResultMetadata {
        ResultMetadata {
            query_hash: key.to_string(),
            snapshot_id: context.snapshot_id.clone(),
            execution_time_ms: started.elapsed().as_millis() as u64,
            source,
            engine_version: ENGINE_VERSION.to_string(),
        }
    }
}
