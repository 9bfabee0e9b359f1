//! Entity and alias records

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable numeric identity for a player, team or venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of entity a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Team,
    Venue,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Team => "team",
            EntityKind::Venue => "venue",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity row. Created once; immutable afterwards except through alias
/// additions, which live in their own table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub primary_name: String,
}

/// One validity window for a name. `valid_to = None` means open-ended.
/// Primary key is `(alias_text, valid_from)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub alias_text: String,
    pub entity_id: EntityId,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

impl Alias {
    /// Whether this window covers the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && self.valid_to.map_or(true, |to| to >= date)
    }

    /// Whether two windows for the same text intersect.
    pub fn overlaps(&self, from: NaiveDate, to: Option<NaiveDate>) -> bool {
        let self_ends_before = self.valid_to.map_or(false, |t| t < from);
        let other_ends_before = to.map_or(false, |t| t < self.valid_from);
        !(self_ends_before || other_ends_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_open_ended_window_covers_future() {
        let alias = Alias {
            alias_text: "V Kohli".into(),
            entity_id: EntityId(1),
            valid_from: d(2008, 1, 1),
            valid_to: None,
        };
        assert!(alias.covers(d(2030, 6, 1)));
        assert!(!alias.covers(d(2007, 12, 31)));
    }

    #[test]
    fn test_bounded_window() {
        let alias = Alias {
            alias_text: "Delhi Daredevils".into(),
            entity_id: EntityId(2),
            valid_from: d(2008, 1, 1),
            valid_to: Some(d(2018, 12, 31)),
        };
        assert!(alias.covers(d(2012, 5, 1)));
        assert!(!alias.covers(d(2019, 1, 1)));
    }

    #[test]
    fn test_overlap_detection() {
        let alias = Alias {
            alias_text: "x".into(),
            entity_id: EntityId(1),
            valid_from: d(2008, 1, 1),
            valid_to: Some(d(2018, 12, 31)),
        };
        // Adjacent, non-overlapping
        assert!(!alias.overlaps(d(2019, 1, 1), None));
        // Intersecting
        assert!(alias.overlaps(d(2018, 12, 31), Some(d(2020, 1, 1))));
        // Contained
        assert!(alias.overlaps(d(2010, 1, 1), Some(d(2011, 1, 1))));
    }
}
