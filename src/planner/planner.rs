//! Plan selection and query construction

use std::collections::BTreeSet;

use crate::query::{FantasyIntent, MatchupIntent, QueryIntent, WinProbIntent};
use crate::store::{
    Aggregate, ColumnFilter, DerivedJoin, DerivedTable, Predicate, StoreQuery, RAW_EVENTS,
};

use super::errors::{PlannerError, PlannerResult};

/// Bumped whenever plan selection or query construction changes shape, so
/// cached results from older planners can never be served.
pub const PLANNER_VERSION: &str = "v2";

/// How the plan reaches its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MaterializedView,
    RawScan,
}

/// Coarse cost estimate. Materialized reads are low, raw scans high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Low,
    High,
}

/// A chosen route for one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub strategy: Strategy,
    pub target_table: String,
    pub cost: Cost,
}

/// Stateless planner. Selection depends only on the intent and the
/// materialized catalogue, so identical inputs always produce the same plan.
pub struct QueryPlanner;

impl QueryPlanner {
    /// Picks the first preferred table present in the catalogue; falls back
    /// to a raw scan otherwise.
    pub fn plan(intent: &QueryIntent, catalogue: &BTreeSet<String>) -> ExecutionPlan {
        let requires = intent.requires();
        for preferred in &requires.preferred_tables {
            if catalogue.contains(*preferred) {
                return ExecutionPlan {
                    strategy: Strategy::MaterializedView,
                    target_table: (*preferred).to_string(),
                    cost: Cost::Low,
                };
            }
        }
        ExecutionPlan {
            strategy: Strategy::RawScan,
            target_table: requires.fallback_table.to_string(),
            cost: Cost::High,
        }
    }

    /// Derived tables the executor must materialize before running the plan.
    pub fn dependencies(intent: &QueryIntent, plan: &ExecutionPlan) -> Vec<DerivedTable> {
        match (intent, plan.strategy) {
            // A raw fantasy scan joins venue baselines on the fly.
            (QueryIntent::Fantasy(_), Strategy::RawScan) => vec![DerivedTable::VenueBaselines],
            _ => Vec::new(),
        }
    }

    /// Builds the concrete typed query for a plan.
    pub fn build_query(intent: &QueryIntent, plan: &ExecutionPlan) -> PlannerResult<StoreQuery> {
        match intent {
            QueryIntent::Matchup(i) => Self::matchup_query(i, plan),
            QueryIntent::Fantasy(i) => Self::fantasy_query(i, plan),
            QueryIntent::WinProb(i) => Self::winprob_query(i, plan),
        }
    }

    fn matchup_query(intent: &MatchupIntent, plan: &ExecutionPlan) -> PlannerResult<StoreQuery> {
        match (plan.strategy, plan.target_table.as_str()) {
            (Strategy::RawScan, RAW_EVENTS) => {
                let mut query = StoreQuery::scan(RAW_EVENTS)
                    .with_filter(ColumnFilter::new(
                        "batter_id",
                        Predicate::InInt(as_i64(&intent.batter_ids)),
                    ))
                    .with_filter(ColumnFilter::new(
                        "bowler_id",
                        Predicate::InInt(as_i64(&intent.bowler_ids)),
                    ));
                if !intent.phases.is_empty() {
                    query = query.with_filter(ColumnFilter::new(
                        "phase",
                        Predicate::InStr(intent.phases.clone()),
                    ));
                }
                if let Some(venues) = &intent.venue_ids {
                    query = query.with_filter(ColumnFilter::new(
                        "venue_id",
                        Predicate::InInt(as_i64(venues)),
                    ));
                }
                Ok(query
                    .with_aggregate(Aggregate::SumInt {
                        column: "runs_batter".into(),
                        alias: "runs".into(),
                    })
                    .with_aggregate(Aggregate::CountRows {
                        alias: "balls".into(),
                    })
                    .with_aggregate(Aggregate::CountTrue {
                        column: "is_wicket".into(),
                        alias: "wickets".into(),
                    }))
            }
            // Pre-aggregated stats tables carry runs/balls/wickets already.
            (Strategy::MaterializedView, "matchup_stats")
            | (Strategy::MaterializedView, "phase_stats") => {
                let mut query = StoreQuery::scan(&plan.target_table)
                    .with_filter(ColumnFilter::new(
                        "batter_id",
                        Predicate::InInt(as_i64(&intent.batter_ids)),
                    ))
                    .with_filter(ColumnFilter::new(
                        "bowler_id",
                        Predicate::InInt(as_i64(&intent.bowler_ids)),
                    ));
                if !intent.phases.is_empty() {
                    query = query.with_filter(ColumnFilter::new(
                        "phase",
                        Predicate::InStr(intent.phases.clone()),
                    ));
                }
                Ok(query
                    .with_aggregate(Aggregate::SumInt {
                        column: "runs".into(),
                        alias: "runs".into(),
                    })
                    .with_aggregate(Aggregate::SumInt {
                        column: "balls".into(),
                        alias: "balls".into(),
                    })
                    .with_aggregate(Aggregate::SumInt {
                        column: "wickets".into(),
                        alias: "wickets".into(),
                    }))
            }
            _ => Err(PlannerError::plan_not_found("Matchup", &plan.target_table)),
        }
    }

    fn fantasy_query(intent: &FantasyIntent, plan: &ExecutionPlan) -> PlannerResult<StoreQuery> {
        match (plan.strategy, plan.target_table.as_str()) {
            (Strategy::RawScan, RAW_EVENTS) => Ok(StoreQuery::scan(RAW_EVENTS)
                .with_filter(ColumnFilter::new(
                    "venue_id",
                    Predicate::EqInt(intent.venue_id as i64),
                ))
                .with_projection(vec![
                    "match_id".into(),
                    "batter_id".into(),
                    "bowler_id".into(),
                    "runs_batter".into(),
                    "runs_extras".into(),
                    "is_wicket".into(),
                ])
                .with_join(DerivedJoin {
                    table: DerivedTable::VenueBaselines.table_name().to_string(),
                    on: "venue_id".into(),
                    columns: vec!["venue_avg_sr".into()],
                })),
            (Strategy::MaterializedView, "fantasy_points_avg")
            | (Strategy::MaterializedView, "venue_bias") => {
                Ok(StoreQuery::scan(&plan.target_table).with_filter(ColumnFilter::new(
                    "venue_id",
                    Predicate::EqInt(intent.venue_id as i64),
                )))
            }
            _ => Err(PlannerError::plan_not_found("Fantasy", &plan.target_table)),
        }
    }

    fn winprob_query(intent: &WinProbIntent, plan: &ExecutionPlan) -> PlannerResult<StoreQuery> {
        match (plan.strategy, plan.target_table.as_str()) {
            (Strategy::RawScan, RAW_EVENTS) => Ok(StoreQuery::scan(RAW_EVENTS)
                .with_filter(ColumnFilter::new(
                    "venue_id",
                    Predicate::EqInt(intent.venue_id as i64),
                ))
                .with_group_by(vec!["match_id".into(), "inning".into()])
                .with_aggregate(Aggregate::SumInt {
                    column: "runs_batter".into(),
                    alias: "runs".into(),
                })
                .with_aggregate(Aggregate::SumInt {
                    column: "runs_extras".into(),
                    alias: "extras".into(),
                })
                .with_aggregate(Aggregate::CountRows {
                    alias: "balls".into(),
                })
                .with_aggregate(Aggregate::CountTrue {
                    column: "is_wicket".into(),
                    alias: "wickets".into(),
                })),
            (Strategy::MaterializedView, "chase_history") => {
                Ok(StoreQuery::scan("chase_history").with_filter(ColumnFilter::new(
                    "venue_id",
                    Predicate::EqInt(intent.venue_id as i64),
                )))
            }
            _ => Err(PlannerError::plan_not_found("WinProb", &plan.target_table)),
        }
    }
}

fn as_i64(ids: &[u64]) -> Vec<i64> {
    ids.iter().map(|&id| id as i64).collect()
}
