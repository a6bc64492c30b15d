//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the fitters and consumed immediately for curve evaluation
//! - exported to CSV/JSON
//! - persisted in the saved-curve store and reloaded for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Cumulative probabilities fixed by contract for the point-based mode.
pub const CALIBRATION_PROBABILITIES: [f64; 3] = [0.25, 0.50, 0.75];

/// Default number of sampled points per curve.
pub const DEFAULT_NUM_POINTS: usize = 1000;

/// Default upper end of the time grid, as a multiple of the scale parameter.
pub const DEFAULT_MAX_TIME_MULTIPLIER: f64 = 3.0;

/// Default lower end of the time grid (kept off zero so `k < 1` stays finite).
pub const DEFAULT_MIN_TIME: f64 = 1e-6;

/// Weibull shape/scale pair.
///
/// - `shape` (k, β): `< 1` decreasing failure rate, `= 1` constant, `> 1` increasing
/// - `scale` (λ, η): characteristic life, the ≈63.2% failure point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullParameters {
    pub shape: f64,
    pub scale: f64,
}

impl WeibullParameters {
    /// Validate and build a parameter pair.
    pub fn new(shape: f64, scale: f64) -> Result<Self, FitError> {
        if !(shape.is_finite() && scale.is_finite() && shape > 0.0 && scale > 0.0) {
            return Err(FitError::InvalidParameters { shape, scale });
        }
        Ok(Self { shape, scale })
    }
}

/// A `(time, F(time))` pair used to calibrate a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub time: f64,
    pub cumulative_probability: f64,
}

impl CalibrationPoint {
    pub fn new(time: f64, cumulative_probability: f64) -> Self {
        Self {
            time,
            cumulative_probability,
        }
    }
}

/// Positive lifetime observations (years) used for MLE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeSample {
    values: Vec<f64>,
}

impl LifetimeSample {
    /// Wrap raw values as-is. Validation happens in the MLE driver so that each
    /// failure keeps its own diagnosable reason.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Build a sample from durations, dropping entries that are not strictly positive.
    pub fn from_durations<I: IntoIterator<Item = f64>>(durations: I) -> Self {
        Self {
            values: durations
                .into_iter()
                .filter(|d| d.is_finite() && *d > 0.0)
                .collect(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count / mean / range of the sample, `None` when empty.
    pub fn summary(&self) -> Option<SampleSummary> {
        if self.values.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(SampleSummary {
            n: self.values.len(),
            mean: sum / self.values.len() as f64,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary reliability figures for a parameter pair (same time unit as the scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    pub mttf: f64,
    pub b10: f64,
    /// Median life.
    pub b50: f64,
    /// `F(scale) ≈ 63.2%`.
    pub characteristic_life: f64,
}

/// Which function of `(shape, scale, t)` to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    Pdf,
    Cdf,
    Hazard,
}

impl CurveType {
    pub const ALL: [CurveType; 3] = [CurveType::Pdf, CurveType::Cdf, CurveType::Hazard];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            CurveType::Pdf => "PDF",
            CurveType::Cdf => "CDF",
            CurveType::Hazard => "Hazard",
        }
    }

    /// Axis title used by plots.
    pub fn axis_title(self) -> &'static str {
        match self {
            CurveType::Pdf => "Probability Density",
            CurveType::Cdf => "Cumulative Probability",
            CurveType::Hazard => "Hazard Rate (Failures per Unit Time)",
        }
    }

    /// Column header in exported tables.
    pub fn column_name(self) -> &'static str {
        match self {
            CurveType::Pdf => "Probability_Density",
            CurveType::Cdf => "Cumulative_Probability",
            CurveType::Hazard => "Hazard_Rate",
        }
    }
}

/// Column selection for an export table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Pdf,
    Cdf,
    Hazard,
    /// PDF + CDF.
    Both,
    /// PDF + CDF + hazard.
    All,
}

impl ExportKind {
    /// Requested curve types, in column order.
    pub fn curve_types(self) -> &'static [CurveType] {
        match self {
            ExportKind::Pdf => &[CurveType::Pdf],
            ExportKind::Cdf => &[CurveType::Cdf],
            ExportKind::Hazard => &[CurveType::Hazard],
            ExportKind::Both => &[CurveType::Pdf, CurveType::Cdf],
            ExportKind::All => &[CurveType::Pdf, CurveType::Cdf, CurveType::Hazard],
        }
    }
}

impl From<CurveType> for ExportKind {
    fn from(value: CurveType) -> Self {
        match value {
            CurveType::Pdf => ExportKind::Pdf,
            CurveType::Cdf => ExportKind::Cdf,
            CurveType::Hazard => ExportKind::Hazard,
        }
    }
}

/// Time grid settings for curve sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub num_points: usize,
    /// Grid ends at `scale * max_time_multiplier`.
    pub max_time_multiplier: f64,
    /// First grid point (small positive epsilon).
    pub min_time: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            max_time_multiplier: DEFAULT_MAX_TIME_MULTIPLIER,
            min_time: DEFAULT_MIN_TIME,
        }
    }
}

impl GridConfig {
    pub fn with_points(num_points: usize) -> Self {
        Self {
            num_points,
            ..Self::default()
        }
    }
}

/// A sampled curve: `times[i] -> values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub curve_type: CurveType,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

/// One sampled time with the requested value columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub time: f64,
    pub density: Option<f64>,
    pub cumulative_probability: Option<f64>,
    pub hazard_rate: Option<f64>,
}

impl ExportRow {
    pub fn value(&self, curve_type: CurveType) -> Option<f64> {
        match curve_type {
            CurveType::Pdf => self.density,
            CurveType::Cdf => self.cumulative_probability,
            CurveType::Hazard => self.hazard_rate,
        }
    }
}

/// Rows aligned on one time grid, with the originating parameters as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub parameters: WeibullParameters,
    pub columns: Vec<CurveType>,
    pub rows: Vec<ExportRow>,
}

/// How a parameter pair was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    Direct,
    Guided,
    Points,
    Mle,
    Fmea,
}

impl FitMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            FitMethod::Direct => "Direct Parameter Input",
            FitMethod::Guided => "Guided Selection",
            FitMethod::Points => "Point-Based Fit",
            FitMethod::Mle => "Maximum Likelihood (MLE)",
            FitMethod::Fmea => "FMEA Failure Mode",
        }
    }
}

/// A curve persisted in the saved-curve store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCurve {
    pub name: String,
    pub description: String,
    pub method: FitMethod,
    pub shape: f64,
    pub scale: f64,
    pub timestamp: DateTime<Utc>,
}

impl SavedCurve {
    pub fn parameters(&self) -> Result<WeibullParameters, FitError> {
        WeibullParameters::new(self.shape, self.scale)
    }
}

/// Output options shared by every command that produces a curve.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub grid: GridConfig,
    pub curve_type: CurveType,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_path: Option<PathBuf>,
    pub export_kind: ExportKind,

    pub save_name: Option<String>,
    pub description: Option<String>,
    pub store_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_reject_non_positive_values() {
        assert!(WeibullParameters::new(2.0, 1.0).is_ok());
        assert!(WeibullParameters::new(0.0, 1.0).is_err());
        assert!(WeibullParameters::new(1.0, -3.0).is_err());
        assert!(WeibullParameters::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn sample_from_durations_drops_non_positive() {
        let sample = LifetimeSample::from_durations([3.0, 0.0, -1.5, 2.0, f64::NAN]);
        assert_eq!(sample.values(), &[3.0, 2.0]);

        let summary = sample.summary().unwrap();
        assert_eq!(summary.n, 2);
        assert!((summary.mean - 2.5).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 3.0);
    }

    #[test]
    fn export_kind_column_order() {
        assert_eq!(
            ExportKind::All.curve_types(),
            &[CurveType::Pdf, CurveType::Cdf, CurveType::Hazard]
        );
        assert_eq!(ExportKind::Both.curve_types(), &[CurveType::Pdf, CurveType::Cdf]);
    }
}
