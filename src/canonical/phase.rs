//! Innings phase classification
//!
//! Materialized once at ingestion from the zero-indexed over number so that
//! queries never recompute it.

use serde::{Deserialize, Serialize};

/// T20 innings phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
}

impl Phase {
    /// Classifies a zero-indexed over: 0-5 Powerplay, 6-14 Middle, 15+ Death.
    pub fn from_over(over: u8) -> Self {
        if over < 6 {
            Phase::Powerplay
        } else if over < 15 {
            Phase::Middle
        } else {
            Phase::Death
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Powerplay => "Powerplay",
            Phase::Middle => "Middle",
            Phase::Death => "Death",
        }
    }

    /// All phases, in innings order.
    pub fn all() -> [Phase; 3] {
        [Phase::Powerplay, Phase::Middle, Phase::Death]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
