//! Cache-key determinism

use std::collections::BTreeMap;

use pitchdb::query::{cache_key, ExecutionMode, MatchupIntent, QueryContext, QueryIntent};

fn context(snapshot: &str) -> QueryContext {
    QueryContext {
        schema_version: "1.0.0".into(),
        snapshot_id: snapshot.into(),
        planner_version: "v2".into(),
        derived_versions: BTreeMap::new(),
    }
}

fn intent(batters: Vec<u64>, phases: Vec<&str>) -> QueryIntent {
    QueryIntent::Matchup(MatchupIntent {
        batter_ids: batters,
        bowler_ids: vec![202],
        phases: phases.into_iter().map(String::from).collect(),
        venue_ids: None,
        mode: ExecutionMode::Exact,
    })
}

#[test]
fn identical_inputs_hash_identically() {
    let a = cache_key(&intent(vec![101], vec!["Death"]), &context("s1"));
    let b = cache_key(&intent(vec![101], vec!["Death"]), &context("s1"));
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}

#[test]
fn any_semantic_change_changes_the_key() {
    let base = cache_key(&intent(vec![101], vec!["Death"]), &context("s1"));
    assert_ne!(
        base,
        cache_key(&intent(vec![102], vec!["Death"]), &context("s1"))
    );
    assert_ne!(
        base,
        cache_key(&intent(vec![101], vec!["Powerplay"]), &context("s1"))
    );
}

#[test]
fn new_snapshot_invalidates_by_key() {
    let before = cache_key(&intent(vec![101], vec![]), &context("ipl-2023"));
    let after = cache_key(&intent(vec![101], vec![]), &context("ipl-2024"));
    assert_ne!(before, after);
}

#[test]
fn planner_and_derived_versions_reach_the_key() {
    let base = cache_key(&intent(vec![101], vec![]), &context("s1"));

    let mut upgraded = context("s1");
    upgraded.planner_version = "v3".into();
    assert_ne!(base, cache_key(&intent(vec![101], vec![]), &upgraded));

    let mut rebuilt = context("s1");
    rebuilt
        .derived_versions
        .insert("venue_baselines".into(), "v2".into());
    assert_ne!(base, cache_key(&intent(vec![101], vec![]), &rebuilt));
}
