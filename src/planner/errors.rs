//! Planner error types

use std::error::Error;
use std::fmt;

/// Planner error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// No known way to answer this intent against the chosen target.
    PitchPlanNotFound,
}

impl PlannerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::PitchPlanNotFound => "PITCH_PLAN_NOT_FOUND",
        }
    }

    /// Plan failures are programming errors, never worth retrying.
    pub fn retryable(&self) -> bool {
        false
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    kind: String,
    target: String,
}

impl PlannerError {
    pub fn plan_not_found(kind: &str, target: &str) -> Self {
        Self {
            code: PlannerErrorCode::PitchPlanNotFound,
            kind: kind.to_string(),
            target: target.to_string(),
        }
    }

    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] no plan for {} query against table '{}'",
            self.code, self.kind, self.target
        )
    }
}

impl Error for PlannerError {}

pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code_and_target() {
        let err = PlannerError::plan_not_found("Matchup", "mystery_table");
        let text = err.to_string();
        assert!(text.contains("PITCH_PLAN_NOT_FOUND"));
        assert!(text.contains("mystery_table"));
        assert!(!err.code().retryable());
    }
}
