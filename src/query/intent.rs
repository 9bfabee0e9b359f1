//! Typed query intents
//!
//! Each analytics question the engine answers is one intent variant with a
//! closed set of fields. Adding a question means adding a variant, so
//! dispatch stays exhaustive and no stringly-typed query names exist.

use std::time::Duration;

use serde::Serialize;

use crate::registry::EntityKind;

/// How strictly a query trades accuracy for cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Exact,
    Approx,
    Budget,
}

/// Event granularity a query needs from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Ball,
    Innings,
    Match,
}

/// Batter-versus-bowler aggregate over selected phases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupIntent {
    pub batter_ids: Vec<u64>,
    pub bowler_ids: Vec<u64>,
    /// Phase names, e.g. "Powerplay". Empty means all phases.
    pub phases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_ids: Option<Vec<u64>>,
    pub mode: ExecutionMode,
}

/// Venue-adjusted fantasy projection inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FantasyIntent {
    pub venue_id: u64,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_cap: Option<u32>,
    pub min_matches: u32,
    pub mode: ExecutionMode,
}

/// Chase win-probability inputs for a match state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinProbIntent {
    pub venue_id: u64,
    pub target_score: u32,
    pub current_runs: u32,
    pub current_wickets: u8,
    pub overs_remaining: f32,
    pub mode: ExecutionMode,
}

/// A fully-typed analytics question.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryIntent {
    Matchup(MatchupIntent),
    Fantasy(FantasyIntent),
    WinProb(WinProbIntent),
}

/// What an intent needs from the store, declared ahead of planning.
#[derive(Debug, Clone, PartialEq)]
pub struct Requires {
    /// Materialized tables that answer the query cheaply, in preference
    /// order.
    pub preferred_tables: Vec<&'static str>,
    /// Raw table scanned when no preferred table is materialized.
    pub fallback_table: &'static str,
    /// Entity kinds the intent references.
    pub entities: Vec<EntityKind>,
    pub granularity: Granularity,
}

impl QueryIntent {
    /// Stable kind name hashed into the cache key.
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryIntent::Matchup(_) => "Matchup",
            QueryIntent::Fantasy(_) => "Fantasy",
            QueryIntent::WinProb(_) => "WinProb",
        }
    }

    pub fn requires(&self) -> Requires {
        match self {
            QueryIntent::Matchup(_) => Requires {
                preferred_tables: vec!["matchup_stats", "phase_stats"],
                fallback_table: "ball_events",
                entities: vec![EntityKind::Player],
                granularity: Granularity::Ball,
            },
            QueryIntent::Fantasy(_) => Requires {
                preferred_tables: vec!["fantasy_points_avg", "venue_bias"],
                fallback_table: "ball_events",
                entities: vec![EntityKind::Player, EntityKind::Venue],
                granularity: Granularity::Match,
            },
            QueryIntent::WinProb(_) => Requires {
                preferred_tables: vec!["chase_history"],
                fallback_table: "ball_events",
                entities: vec![EntityKind::Venue],
                granularity: Granularity::Innings,
            },
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            QueryIntent::Matchup(i) => i.mode,
            QueryIntent::Fantasy(i) => i.mode,
            QueryIntent::WinProb(i) => i.mode,
        }
    }
}

/// Runtime knobs that never affect results and never reach the cache key.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    pub timeout: Option<Duration>,
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let intent = MatchupIntent {
            batter_ids: vec![1],
            bowler_ids: vec![2],
            phases: vec!["Death".into()],
            venue_ids: None,
            mode: ExecutionMode::Exact,
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert!(json.get("venue_ids").is_none());
        assert_eq!(json["mode"], "exact");
    }

    #[test]
    fn test_requires_per_kind() {
        let matchup = QueryIntent::Matchup(MatchupIntent {
            batter_ids: vec![],
            bowler_ids: vec![],
            phases: vec![],
            venue_ids: None,
            mode: ExecutionMode::Exact,
        });
        let req = matchup.requires();
        assert_eq!(req.preferred_tables, vec!["matchup_stats", "phase_stats"]);
        assert_eq!(req.fallback_table, "ball_events");
        assert_eq!(req.granularity, Granularity::Ball);
    }
}
