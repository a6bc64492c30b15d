//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`]: typed failures of the fitting core (validation vs divergence)
//! - [`AppError`]: what the binary reports, carrying a process exit code
//!
//! Exit codes:
//! - `2`: unusable user input or IO failure (bad flags, unreadable files)
//! - `3`: validation failure (insufficient or invalid data)
//! - `4`: fit divergence or external service failure

use thiserror::Error;

/// Failure of a single fit or evaluation call.
///
/// Every variant is terminal for the call that produced it; nothing in the
/// core retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Invalid Weibull parameters: shape={shape}, scale={scale} (both must be finite and > 0).")]
    InvalidParameters { shape: f64, scale: f64 },

    #[error(
        "Ages must be in ascending order (25% <= 50% <= 75%): point #{index} at {time} comes before {previous}."
    )]
    PointsOutOfOrder { index: usize, previous: f64, time: f64 },

    #[error("Invalid calibration point: {0}")]
    InvalidCalibrationPoint(String),

    #[error("Need at least {need} data points for fitting, got {have}.")]
    InsufficientData { have: usize, need: usize },

    #[error("All lifetimes must be positive (observation #{index} is {value}).")]
    NonPositiveLifetime { index: usize, value: f64 },

    #[error("Invalid time grid: {0}")]
    InvalidGrid(String),

    #[error("Could not fit Weibull curve to provided points: {0}")]
    DegenerateFit(String),

    #[error("Optimization failed after {iterations} iterations: {reason}")]
    NotConverged { iterations: usize, reason: String },

    #[error("Optimization resulted in invalid parameters: shape={shape}, scale={scale}.")]
    NonFiniteResult { shape: f64, scale: f64 },
}

impl FitError {
    /// `true` for malformed input, `false` for numerical divergence.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FitError::InvalidParameters { .. }
                | FitError::PointsOutOfOrder { .. }
                | FitError::InvalidCalibrationPoint(_)
                | FitError::InsufficientData { .. }
                | FitError::NonPositiveLifetime { .. }
                | FitError::InvalidGrid(_)
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = if err.is_validation() { 3 } else { 4 };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let validation: AppError = FitError::InsufficientData { have: 1, need: 2 }.into();
        assert_eq!(validation.exit_code(), 3);
        assert!(validation.message().contains("at least 2 data points"));

        let divergence: AppError = FitError::NotConverged {
            iterations: 1000,
            reason: "maximum iterations reached".to_string(),
        }
        .into();
        assert_eq!(divergence.exit_code(), 4);
    }
}
