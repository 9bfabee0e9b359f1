//! Raw match document model
//!
//! Serde model of the nested ball-by-ball document format fed in by external
//! data loaders. Everything optional here is genuinely optional in the wild;
//! the canonicalizer decides how each gap is patched.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A complete raw match document.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMatch {
    #[serde(default)]
    pub info: RawInfo,
    #[serde(default)]
    pub innings: Vec<RawInnings>,
}

/// Match-level metadata.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawInfo {
    /// Source-assigned match number, used as the match id
    #[serde(default)]
    pub match_type_number: Option<u64>,
    /// ISO dates; the first one is the match date
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub venue: Option<String>,
    /// The two competing team names
    #[serde(default)]
    pub teams: Vec<String>,
}

/// One innings: the batting team and its overs in order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInnings {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub overs: Vec<RawOver>,
}

/// One over, zero-indexed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOver {
    pub over: u8,
    #[serde(default)]
    pub deliveries: Vec<RawDelivery>,
}

/// One delivery, legal or illegal.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDelivery {
    pub batter: String,
    pub bowler: String,
    #[serde(default)]
    pub non_striker: Option<String>,
    #[serde(default)]
    pub runs: RawRuns,
    #[serde(default)]
    pub extras: Option<RawExtras>,
    #[serde(default)]
    pub wickets: Vec<RawWicket>,
}

/// Run breakdown for a delivery.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRuns {
    #[serde(default)]
    pub batter: i64,
    #[serde(default)]
    pub extras: i64,
    #[serde(default)]
    pub total: i64,
}

/// Extras present on a delivery, keyed by kind (wides, noballs, byes,
/// legbyes, penalty). Unknown kinds are preserved.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawExtras {
    #[serde(flatten)]
    pub kinds: BTreeMap<String, i64>,
}

impl RawExtras {
    pub fn has(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }
}

/// A dismissal on a delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWicket {
    pub kind: String,
    #[serde(default)]
    pub player_out: Option<String>,
}
