//! Full pipeline: raw match → canonical table → store → planned,
//! cache-backed execution.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pitchdb::cache::{CachedValue, MemoryCache};
use pitchdb::canonical::canonicalize_match;
use pitchdb::config::EngineConfig;
use pitchdb::executor::{ResultSource, RuntimeExecutor};
use pitchdb::query::{ExecutionMode, ExecutionOptions, MatchupIntent, QueryIntent};
use pitchdb::registry::IdentityRegistry;
use pitchdb::store::StorageEngine;
use serde_json::json;

/// Two death-over balls of Kohli vs Bumrah: a boundary, then a wicket.
fn kohli_vs_bumrah() -> serde_json::Value {
    json!({
        "info": {
            "match_type_number": 1,
            "dates": ["2023-05-21"],
            "venue": "Wankhede Stadium",
            "teams": ["India", "Australia"]
        },
        "innings": [{
            "team": "India",
            "overs": [{"over": 16, "deliveries": [
                {"batter": "V Kohli", "bowler": "J Bumrah", "non_striker": "R Sharma",
                 "runs": {"batter": 4, "extras": 0, "total": 4}},
                {"batter": "V Kohli", "bowler": "J Bumrah", "non_striker": "R Sharma",
                 "runs": {"batter": 0, "extras": 0, "total": 0},
                 "wickets": [{"kind": "caught", "player_out": "V Kohli"}]}
            ]}]
        }]
    })
}

fn setup() -> (Arc<StorageEngine>, IdentityRegistry, RuntimeExecutor) {
    let engine = Arc::new(StorageEngine::new(&EngineConfig::default()));
    let registry = IdentityRegistry::new();
    let executor = RuntimeExecutor::new(
        Arc::clone(&engine),
        Arc::new(MemoryCache::new()),
        Duration::from_secs(3600),
    );
    (engine, registry, executor)
}

fn ingest(engine: &StorageEngine, registry: &IdentityRegistry, doc: serde_json::Value, tag: &str, append: bool) {
    let raw = serde_json::from_value(doc).unwrap();
    let canonical = canonicalize_match(&raw, registry).unwrap();
    engine.ingest(canonical.table, tag, append).unwrap();
}

fn matchup_intent(registry: &IdentityRegistry) -> QueryIntent {
    let date = NaiveDate::from_ymd_opt(2023, 5, 21).unwrap();
    let kohli = registry.resolve_player("V Kohli", date, false).unwrap();
    let bumrah = registry.resolve_player("J Bumrah", date, false).unwrap();
    QueryIntent::Matchup(MatchupIntent {
        batter_ids: vec![kohli.0],
        bowler_ids: vec![bumrah.0],
        phases: vec!["Death".into()],
        venue_ids: None,
        mode: ExecutionMode::Exact,
    })
}

#[test]
fn two_ball_matchup_aggregates_correctly() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);

    let result = executor
        .execute(&matchup_intent(&registry), &ExecutionOptions::default())
        .unwrap();
    assert_eq!(result.meta.source, ResultSource::Compute);
    assert_eq!(result.meta.snapshot_id, "m1");

    let CachedValue::Table(table) = &result.data else {
        panic!("matchup result is tabular");
    };
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.int_at("runs", 0), Some(4));
    assert_eq!(table.int_at("balls", 0), Some(2));
    assert_eq!(table.int_at("wickets", 0), Some(1));
}

#[test]
fn repeat_query_hits_the_cache_with_identical_data() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);
    let intent = matchup_intent(&registry);

    let first = executor.execute(&intent, &ExecutionOptions::default()).unwrap();
    let second = executor.execute(&intent, &ExecutionOptions::default()).unwrap();

    assert_eq!(first.meta.source, ResultSource::Compute);
    assert_eq!(second.meta.source, ResultSource::Cache);
    assert_eq!(second.meta.query_hash, first.meta.query_hash);
    assert_eq!(second.data, first.data);
}

#[test]
fn runtime_options_do_not_change_the_key() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);
    let intent = matchup_intent(&registry);

    let plain = executor.execute(&intent, &ExecutionOptions::default()).unwrap();
    let tuned = executor
        .execute(
            &intent,
            &ExecutionOptions {
                timeout: Some(Duration::from_secs(30)),
                verbose: true,
            },
        )
        .unwrap();

    // Same semantics, same key: the tuned call is served from cache.
    assert_eq!(tuned.meta.query_hash, plain.meta.query_hash);
    assert_eq!(tuned.meta.source, ResultSource::Cache);
}

#[test]
fn aggregation_spans_appended_matches() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);

    let intent = matchup_intent(&registry);
    let before = executor.execute(&intent, &ExecutionOptions::default()).unwrap();

    // A second meeting at another ground: two singles, no wicket.
    let rematch = json!({
        "info": {
            "match_type_number": 2,
            "dates": ["2023-05-28"],
            "venue": "Eden Gardens",
            "teams": ["India", "Australia"]
        },
        "innings": [{
            "team": "India",
            "overs": [{"over": 17, "deliveries": [
                {"batter": "V Kohli", "bowler": "J Bumrah", "non_striker": "R Sharma",
                 "runs": {"batter": 1, "extras": 0, "total": 1}},
                {"batter": "V Kohli", "bowler": "J Bumrah", "non_striker": "R Sharma",
                 "runs": {"batter": 1, "extras": 0, "total": 1}}
            ]}]
        }]
    });
    ingest(&engine, &registry, rematch, "m2", true);

    let after = executor.execute(&intent, &ExecutionOptions::default()).unwrap();
    // The ingest moved the snapshot, so this is a fresh computation.
    assert_ne!(after.meta.query_hash, before.meta.query_hash);
    assert_eq!(after.meta.source, ResultSource::Compute);
    assert_eq!(after.meta.snapshot_id, "m2");

    let CachedValue::Table(table) = &after.data else {
        panic!("matchup result is tabular");
    };
    assert_eq!(table.int_at("runs", 0), Some(6));
    assert_eq!(table.int_at("balls", 0), Some(4));
    assert_eq!(table.int_at("wickets", 0), Some(1));
}

#[test]
fn win_prob_query_groups_chase_history_per_innings() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);

    let date = NaiveDate::from_ymd_opt(2023, 5, 21).unwrap();
    let venue = registry
        .resolve_venue("Wankhede Stadium", Some(date), false)
        .unwrap();
    let intent = QueryIntent::WinProb(pitchdb::query::WinProbIntent {
        venue_id: venue.0,
        target_score: 180,
        current_runs: 40,
        current_wickets: 2,
        overs_remaining: 12.0,
        mode: ExecutionMode::Exact,
    });

    let result = executor.execute(&intent, &ExecutionOptions::default()).unwrap();
    let CachedValue::Table(table) = &result.data else {
        panic!("win-prob history is tabular");
    };
    // One innings ingested: one grouped row.
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.int_at("inning", 0), Some(1));
    assert_eq!(table.int_at("runs", 0), Some(4));
    assert_eq!(table.int_at("balls", 0), Some(2));
    assert_eq!(table.int_at("wickets", 0), Some(1));
}

#[test]
fn fantasy_query_materializes_venue_baselines() {
    let (engine, registry, executor) = setup();
    ingest(&engine, &registry, kohli_vs_bumrah(), "m1", false);

    let date = NaiveDate::from_ymd_opt(2023, 5, 21).unwrap();
    let venue = registry
        .resolve_venue("Wankhede Stadium", Some(date), false)
        .unwrap();
    let intent = QueryIntent::Fantasy(pitchdb::query::FantasyIntent {
        venue_id: venue.0,
        roles: vec!["batter".into()],
        budget_cap: None,
        min_matches: 1,
        mode: ExecutionMode::Exact,
    });

    let result = executor.execute(&intent, &ExecutionOptions::default()).unwrap();
    assert!(engine.table_exists("venue_baselines"));

    let CachedValue::Table(table) = &result.data else {
        panic!("fantasy result is tabular");
    };
    assert_eq!(table.num_rows(), 2);
    // 4 runs off 2 balls at this ground: baseline strike rate 200.
    assert_eq!(table.float_at("venue_avg_sr", 0), Some(200.0));
}
