//! Failure Mode and Effects Analysis.
//!
//! An FMEA table lists, per failure mode, its cause and effect, the
//! severity/occurrence/detection ratings (1–10) with their product, the Risk
//! Priority Number, and a Weibull `(β, η)` pair with η in operating hours.
//!
//! The operating characteristics sent with a request are checked against a
//! per-asset catalog ([`operating_characteristics`]) first.
//!
//! Tables come from a [`FailureModeSource`]:
//!
//! - [`OpenAiFmeaClient`]: generated by a chat-completions model
//! - [`DefaultFailureModes`]: built-in tables used offline or as a fallback
//!
//! Each mode's Weibull pair is summarized (MTTF, B10 life) with the same
//! function library as every other curve.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::WeibullParameters;
use crate::error::{AppError, FitError};
use crate::models::{b_life, mttf};

pub mod assets;
pub mod defaults;
pub mod openai;

pub use assets::*;
pub use defaults::*;
pub use openai::*;

/// Free-form operating characteristics, e.g. `"Cooling Type" -> "ONAF"`.
pub type OperatingCharacteristics = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    pub failure_mode: String,
    pub cause: String,
    pub effect: String,
    pub severity: u32,
    pub occurrence: u32,
    pub detection: u32,
    pub rpn: u32,
    pub weibull_beta: f64,
    /// Characteristic life, hours.
    pub weibull_eta: f64,
    /// Hours.
    pub mttf: f64,
    pub recommendations: String,
}

impl FailureMode {
    pub fn parameters(&self) -> Result<WeibullParameters, FitError> {
        WeibullParameters::new(self.weibull_beta, self.weibull_eta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmeaReport {
    pub asset_type: String,
    pub characteristics: OperatingCharacteristics,
    pub failure_modes: Vec<FailureMode>,
    /// Which source produced the table.
    pub source: String,
}

impl FmeaReport {
    /// Failure modes ordered by RPN, highest first.
    pub fn ranked(&self) -> Vec<&FailureMode> {
        let mut modes: Vec<&FailureMode> = self.failure_modes.iter().collect();
        modes.sort_by(|a, b| b.rpn.cmp(&a.rpn));
        modes
    }
}

/// Anything that can produce an FMEA table for an asset.
pub trait FailureModeSource {
    fn name(&self) -> &str;

    fn generate(
        &self,
        asset_type: &str,
        characteristics: &OperatingCharacteristics,
    ) -> Result<FmeaReport, AppError>;
}

/// Try `primary`; on failure log a warning and use `fallback`.
pub fn generate_with_fallback(
    primary: &dyn FailureModeSource,
    fallback: &dyn FailureModeSource,
    asset_type: &str,
    characteristics: &OperatingCharacteristics,
) -> Result<FmeaReport, AppError> {
    match primary.generate(asset_type, characteristics) {
        Ok(report) if !report.failure_modes.is_empty() => Ok(report),
        Ok(_) => {
            warn!(source = primary.name(), asset_type, "source returned no failure modes, using defaults");
            fallback.generate(asset_type, characteristics)
        }
        Err(err) => {
            warn!(source = primary.name(), asset_type, error = %err, "FMEA generation failed, using defaults");
            fallback.generate(asset_type, characteristics)
        }
    }
}

/// Curve metrics derived from a failure mode's Weibull pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureModeCurve {
    pub parameters: WeibullParameters,
    /// `η Γ(1 + 1/β)`, hours.
    pub mttf: f64,
    /// Hours until 10% have failed.
    pub b10: f64,
}

pub fn summarize_mode(mode: &FailureMode) -> Result<FailureModeCurve, FitError> {
    let parameters = mode.parameters()?;
    let b10 = b_life(parameters, 10.0).unwrap_or(f64::NAN);
    Ok(FailureModeCurve {
        parameters,
        mttf: mttf(parameters),
        b10,
    })
}

/// Parse `key=value` pairs into characteristics.
pub fn parse_characteristics<S: AsRef<str>>(pairs: &[S]) -> Result<OperatingCharacteristics, AppError> {
    let mut out = OperatingCharacteristics::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::new(2, format!("Invalid characteristic '{pair}', expected key=value.")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::new(2, format!("Invalid characteristic '{pair}', empty key.")));
        }
        out.insert(key.to_string(), value.trim().to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl FailureModeSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _: &str, _: &OperatingCharacteristics) -> Result<FmeaReport, AppError> {
            Err(AppError::new(4, "service unavailable"))
        }
    }

    #[test]
    fn falls_back_to_defaults() {
        let report = generate_with_fallback(
            &Failing,
            &DefaultFailureModes,
            "Circuit Breaker",
            &OperatingCharacteristics::new(),
        )
        .unwrap();
        assert_eq!(report.source, DefaultFailureModes.name());
        assert_eq!(report.failure_modes[0].failure_mode, "Contact Wear");
    }

    #[test]
    fn summary_uses_gamma_mttf() {
        let report = DefaultFailureModes
            .generate("Power Transformer", &OperatingCharacteristics::new())
            .unwrap();
        let curve = summarize_mode(&report.failure_modes[0]).unwrap();
        // β = 3.5, η = 80000: MTTF = 80000 Γ(1 + 1/3.5) ≈ 71 980.
        assert!((curve.mttf - 71_980.0).abs() < 5.0, "mttf={}", curve.mttf);
        assert!(curve.b10 < curve.mttf);
    }

    #[test]
    fn ranked_orders_by_rpn() {
        let report = DefaultFailureModes
            .generate("Power Transformer", &OperatingCharacteristics::new())
            .unwrap();
        let ranked = report.ranked();
        assert!(ranked.windows(2).all(|w| w[0].rpn >= w[1].rpn));
        assert_eq!(ranked[0].rpn, 240);
    }

    #[test]
    fn characteristics_parse() {
        let c = parse_characteristics(&["Cooling Type=ONAF", " Age (years) = 25 "]).unwrap();
        assert_eq!(c.get("Cooling Type").map(String::as_str), Some("ONAF"));
        assert_eq!(c.get("Age (years)").map(String::as_str), Some("25"));
        assert!(parse_characteristics(&["novalue"]).is_err());
    }
}
