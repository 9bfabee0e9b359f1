//! Raw match → strict v1 event table
//!
//! Column buffers are filled delivery by delivery, then assembled into one
//! immutable table and validated against the frozen contract. The contract
//! check is the single gatekeeper: nothing malformed gets past this function
//! into storage.

use chrono::NaiveDate;

use super::errors::{CanonicalError, CanonicalResult};
use super::phase::Phase;
use super::raw::RawMatch;
use super::runs::RunComponent;
use crate::registry::IdentityRegistry;
use crate::schema::ball_event_v1;
use crate::table::{Column, DictColumn, Table};

/// Placeholder name for actors and teams the document does not identify.
const UNKNOWN: &str = "Unknown";

/// Date used when the document carries no parsable date.
fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date")
}

/// How many rows needed a patch during canonicalization.
///
/// Fallbacks keep a whole match from failing on one malformed delivery, but
/// they are surfaced here instead of silently polluting aggregates: callers
/// can reject or flag matches with nonzero counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalReport {
    /// Total event rows produced
    pub rows: usize,
    /// Rows whose bowling team fell back to the placeholder
    pub fallback_team_rows: usize,
    /// Rows whose non-striker fell back to the placeholder
    pub missing_non_striker_rows: usize,
}

/// A canonicalized match: the strict event table plus its patch report.
#[derive(Debug, Clone)]
pub struct CanonicalMatch {
    pub table: Table,
    pub report: CanonicalReport,
}

struct EventBuffers {
    match_id: Vec<String>,
    date: Vec<NaiveDate>,
    venue_id: Vec<i32>,
    inning: Vec<i8>,
    over: Vec<i8>,
    ball: Vec<i8>,
    batter_id: Vec<i32>,
    bowler_id: Vec<i32>,
    non_striker_id: Vec<i32>,
    batting_team_id: Vec<i16>,
    bowling_team_id: Vec<i16>,
    runs_batter: Vec<i8>,
    runs_extras: Vec<i8>,
    is_wicket: Vec<bool>,
    wicket_type: DictColumn,
    phase: DictColumn,
}

impl EventBuffers {
    fn new() -> Self {
        Self {
            match_id: Vec::new(),
            date: Vec::new(),
            venue_id: Vec::new(),
            inning: Vec::new(),
            over: Vec::new(),
            ball: Vec::new(),
            batter_id: Vec::new(),
            bowler_id: Vec::new(),
            non_striker_id: Vec::new(),
            batting_team_id: Vec::new(),
            bowling_team_id: Vec::new(),
            runs_batter: Vec::new(),
            runs_extras: Vec::new(),
            is_wicket: Vec::new(),
            wicket_type: DictColumn::new(),
            phase: DictColumn::new(),
        }
    }

    fn into_table(self) -> crate::schema::SchemaResult<Table> {
        Table::new(vec![
            ("match_id".into(), Column::Utf8(self.match_id)),
            ("date".into(), Column::Date32(self.date)),
            ("venue_id".into(), Column::Int32(self.venue_id)),
            ("inning".into(), Column::Int8(self.inning)),
            ("over".into(), Column::Int8(self.over)),
            ("ball".into(), Column::Int8(self.ball)),
            ("batter_id".into(), Column::Int32(self.batter_id)),
            ("bowler_id".into(), Column::Int32(self.bowler_id)),
            ("non_striker_id".into(), Column::Int32(self.non_striker_id)),
            (
                "batting_team_id".into(),
                Column::Int16(self.batting_team_id),
            ),
            (
                "bowling_team_id".into(),
                Column::Int16(self.bowling_team_id),
            ),
            ("runs_batter".into(), Column::Int8(self.runs_batter)),
            ("runs_extras".into(), Column::Int8(self.runs_extras)),
            ("is_wicket".into(), Column::Bool(self.is_wicket)),
            ("wicket_type".into(), Column::Dict8(self.wicket_type)),
            ("phase".into(), Column::Dict8(self.phase)),
        ])
    }
}

/// Narrows a raw integer into a contract column type, failing instead of
/// wrapping.
fn narrow<T, V>(column: &'static str, value: V) -> CanonicalResult<T>
where
    T: TryFrom<V>,
    V: Copy + Into<i128>,
{
    T::try_from(value).map_err(|_| CanonicalError::OutOfRange {
        column,
        value: value.into(),
    })
}

fn parse_match_date(dates: &[String]) -> NaiveDate {
    dates
        .first()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(epoch_date)
}

/// Canonicalizes one raw match document into the frozen v1 schema.
///
/// Venue, team and player names are resolved through the registry with
/// auto-ingestion enabled: match data sources are incomplete and evolving,
/// so unseen names mint new entities rather than failing ingestion.
pub fn canonicalize_match(
    raw: &RawMatch,
    registry: &IdentityRegistry,
) -> CanonicalResult<CanonicalMatch> {
    let match_date = parse_match_date(&raw.info.dates);
    let match_id = raw
        .info
        .match_type_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "0".to_string());

    let venue_name = raw.info.venue.as_deref().unwrap_or("Unknown Venue");
    let venue_id = registry.resolve_venue(venue_name, Some(match_date), true)?;
    let venue_code: i32 = narrow("venue_id", venue_id.0)?;

    let mut buffers = EventBuffers::new();
    let mut report = CanonicalReport::default();

    for (inning_idx, innings) in raw.innings.iter().enumerate() {
        let batting_team = innings.team.as_deref().unwrap_or(UNKNOWN);
        let batting_team_id = registry.resolve_team(batting_team, Some(match_date), true)?;

        // The bowling side is the other entry in `teams`; a missing or
        // one-sided list falls back to the placeholder team.
        let bowling_team = raw
            .info
            .teams
            .iter()
            .find(|t| t.as_str() != batting_team)
            .map(|t| t.as_str());
        let bowling_fallback = bowling_team.is_none();
        let bowling_team_id =
            registry.resolve_team(bowling_team.unwrap_or(UNKNOWN), Some(match_date), true)?;

        let batting_team_code: i16 = narrow("batting_team_id", batting_team_id.0)?;
        let bowling_team_code: i16 = narrow("bowling_team_id", bowling_team_id.0)?;
        let inning_number: i8 = narrow("inning", (inning_idx + 1) as u64)?;

        for over in &innings.overs {
            let phase = Phase::from_over(over.over);
            let over_number: i8 = narrow("over", over.over)?;

            for (ball_idx, delivery) in over.deliveries.iter().enumerate() {
                let batter_id = registry.resolve_player(&delivery.batter, match_date, true)?;
                let bowler_id = registry.resolve_player(&delivery.bowler, match_date, true)?;

                let non_striker = delivery.non_striker.as_deref();
                if non_striker.is_none() {
                    report.missing_non_striker_rows += 1;
                }
                let non_striker_id =
                    registry.resolve_player(non_striker.unwrap_or(UNKNOWN), match_date, true)?;

                let component = RunComponent::classify(delivery.extras.as_ref());
                // Off-the-bat runs only count when the delivery credits the
                // batter; byes and leg-byes stay in extras.
                let runs_batter = if component.credits_batter() {
                    delivery.runs.batter
                } else {
                    0
                };

                if bowling_fallback {
                    report.fallback_team_rows += 1;
                }

                buffers.match_id.push(match_id.clone());
                buffers.date.push(match_date);
                buffers.venue_id.push(venue_code);
                buffers.inning.push(inning_number);
                buffers.over.push(over_number);
                buffers.ball.push(narrow("ball", (ball_idx + 1) as u64)?);
                buffers.batter_id.push(narrow("batter_id", batter_id.0)?);
                buffers.bowler_id.push(narrow("bowler_id", bowler_id.0)?);
                buffers
                    .non_striker_id
                    .push(narrow("non_striker_id", non_striker_id.0)?);
                buffers.batting_team_id.push(batting_team_code);
                buffers.bowling_team_id.push(bowling_team_code);
                buffers.runs_batter.push(narrow("runs_batter", runs_batter)?);
                buffers
                    .runs_extras
                    .push(narrow("runs_extras", delivery.runs.extras)?);
                buffers.is_wicket.push(!delivery.wickets.is_empty());
                buffers
                    .wicket_type
                    .push(delivery.wickets.first().map(|w| w.kind.as_str()))?;
                buffers.phase.push(Some(phase.as_str()))?;

                report.rows += 1;
            }
        }
    }

    let table = buffers.into_table()?;
    // Gatekeeper: nothing that fails the contract reaches storage.
    ball_event_v1().validate(&table)?;

    Ok(CanonicalMatch { table, report })
}
