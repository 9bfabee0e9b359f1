//! Delivery run classification
//!
//! Encodes the scoring rules explicitly instead of leaving them implied by
//! aggregate arithmetic:
//! - a wide or no-ball counts toward team and bowler runs but is not a ball
//!   faced by the batter;
//! - a bye or leg-bye counts toward team runs only;
//! - a normal delivery credits the batter and counts as a ball faced.
//!
//! This keeps "balls bowled" and "balls faced" distinct at the source.

use crate::canonical::raw::RawExtras;

/// Classification of a single delivery by its extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunComponent {
    Wide,
    NoBall,
    Bye,
    LegBye,
    Normal,
}

impl RunComponent {
    /// Classifies a delivery. Wides and no-balls take precedence over byes
    /// because a no-ball with byes is still not a ball faced.
    pub fn classify(extras: Option<&RawExtras>) -> Self {
        match extras {
            None => RunComponent::Normal,
            Some(e) => {
                if e.has("wides") {
                    RunComponent::Wide
                } else if e.has("noballs") {
                    RunComponent::NoBall
                } else if e.has("byes") {
                    RunComponent::Bye
                } else if e.has("legbyes") {
                    RunComponent::LegBye
                } else {
                    RunComponent::Normal
                }
            }
        }
    }

    /// Whether the batter faced this delivery. Wides are the only delivery
    /// the batter does not face.
    pub fn counts_ball_faced(&self) -> bool {
        !matches!(self, RunComponent::Wide)
    }

    /// Whether runs off the bat are credited to the batter.
    pub fn credits_batter(&self) -> bool {
        matches!(self, RunComponent::Normal | RunComponent::NoBall)
    }

    /// Whether the runs count against the bowler's analysis. Byes and
    /// leg-byes are team extras, not bowler runs.
    pub fn credits_bowler(&self) -> bool {
        matches!(
            self,
            RunComponent::Normal | RunComponent::Wide | RunComponent::NoBall
        )
    }
}
