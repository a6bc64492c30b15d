//! Guided parameter selection.
//!
//! Two questions stand in for data: the dominant failure pattern picks a
//! family of shapes, a yes/no follow-up picks one of two, and the expected
//! asset life becomes the scale.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::WeibullParameters;
use crate::error::FitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePattern {
    /// Aging and wear-out dominant.
    WearOut,
    /// Early-life or random failure dominant.
    EarlyLife,
    /// Neither of the above.
    Neither,
}

impl FailurePattern {
    pub fn display_name(self) -> &'static str {
        match self {
            FailurePattern::WearOut => "Aging and wear-out dominant",
            FailurePattern::EarlyLife => "Early-life or random failure dominant",
            FailurePattern::Neither => "Neither of the above",
        }
    }

    /// The yes/no question asked for this pattern.
    pub fn follow_up_question(self) -> &'static str {
        match self {
            FailurePattern::WearOut => "Do failures occur predictably near end of life?",
            FailurePattern::EarlyLife => "Are failures mostly due to manufacturing defects or bugs?",
            FailurePattern::Neither => "Does failure probability remain low until late life?",
        }
    }
}

/// Shape implied by the questionnaire answers.
pub fn guided_shape(pattern: FailurePattern, answer: bool) -> f64 {
    match (pattern, answer) {
        (FailurePattern::WearOut, true) => 4.0,
        (FailurePattern::WearOut, false) => 2.5,
        (FailurePattern::EarlyLife, true) => 0.5,
        (FailurePattern::EarlyLife, false) => 1.0,
        (FailurePattern::Neither, true) => 6.0,
        (FailurePattern::Neither, false) => 1.5,
    }
}

/// Parameters from the questionnaire, with the expected life as the scale.
pub fn fit_guided(
    pattern: FailurePattern,
    answer: bool,
    expected_life: f64,
) -> Result<WeibullParameters, FitError> {
    WeibullParameters::new(guided_shape(pattern, answer), expected_life)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_select_shape() {
        assert_eq!(guided_shape(FailurePattern::WearOut, true), 4.0);
        assert_eq!(guided_shape(FailurePattern::EarlyLife, true), 0.5);
        assert_eq!(guided_shape(FailurePattern::Neither, false), 1.5);
    }

    #[test]
    fn expected_life_becomes_scale() {
        let p = fit_guided(FailurePattern::EarlyLife, false, 12.0).unwrap();
        assert_eq!(p.shape, 1.0);
        assert_eq!(p.scale, 12.0);
        assert!(fit_guided(FailurePattern::WearOut, true, 0.0).is_err());
    }
}
