//! Fit pipeline shared by every fitting command.
//!
//! A fit is an explicit request/response exchange:
//! `FitRequest` (input mode + output settings) -> fit -> metrics -> sampled
//! curve + export table -> `FitResponse`. Nothing is kept between calls; the
//! caller decides what to print, export or save.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{
    CalibrationPoint, CurveSeries, CurveType, ExportKind, ExportTable, FitMethod, GridConfig,
    LifetimeSample, ReliabilityMetrics, SampleSummary, SavedCurve, WeibullParameters,
};
use crate::error::AppError;
use crate::fit::{FailurePattern, MleFit, MleOptions, calibration_points, fit_calibration_points, fit_guided, fit_mle};
use crate::models::{build_export_table, cdf, evaluate_curve, reliability_metrics};

/// Where the parameters come from.
#[derive(Debug, Clone)]
pub enum FitInput {
    Direct { shape: f64, scale: f64 },
    Guided {
        pattern: FailurePattern,
        answer: bool,
        expected_life: f64,
    },
    Points { times: [f64; 3] },
    Sample {
        sample: LifetimeSample,
        options: MleOptions,
    },
}

impl FitInput {
    pub fn method(&self) -> FitMethod {
        match self {
            FitInput::Direct { .. } => FitMethod::Direct,
            FitInput::Guided { .. } => FitMethod::Guided,
            FitInput::Points { .. } => FitMethod::Points,
            FitInput::Sample { .. } => FitMethod::Mle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FitRequest {
    pub input: FitInput,
    pub grid: GridConfig,
    pub curve_type: CurveType,
    pub export_kind: ExportKind,
}

/// How well a point fit reproduces one calibration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationCheck {
    pub point: CalibrationPoint,
    pub fitted_probability: f64,
}

/// All computed outputs of a single fit.
#[derive(Debug, Clone)]
pub struct FitResponse {
    pub method: FitMethod,
    pub parameters: WeibullParameters,
    pub metrics: ReliabilityMetrics,
    pub curve: CurveSeries,
    pub export: ExportTable,
    /// Point mode only.
    pub calibration: Vec<CalibrationCheck>,
    /// MLE mode only.
    pub mle: Option<MleFit>,
    pub sample: Option<SampleSummary>,
}

/// Run one fit and sample its curves.
pub fn run_fit(request: &FitRequest) -> Result<FitResponse, AppError> {
    let mut calibration = Vec::new();
    let mut mle = None;
    let mut sample_summary = None;

    let parameters = match &request.input {
        FitInput::Direct { shape, scale } => WeibullParameters::new(*shape, *scale)?,
        FitInput::Guided {
            pattern,
            answer,
            expected_life,
        } => fit_guided(*pattern, *answer, *expected_life)?,
        FitInput::Points { times } => {
            let points = calibration_points(*times);
            let params = fit_calibration_points(&points)?;
            calibration = points
                .iter()
                .map(|&point| CalibrationCheck {
                    point,
                    fitted_probability: cdf(params, point.time),
                })
                .collect();
            params
        }
        FitInput::Sample { sample, options } => {
            sample_summary = sample.summary();
            let fit = fit_mle(sample.values(), options)?;
            let params = fit.parameters;
            mle = Some(fit);
            params
        }
    };

    debug!(
        method = ?request.input.method(),
        shape = parameters.shape,
        scale = parameters.scale,
        "fit complete"
    );

    let curve = evaluate_curve(parameters, request.curve_type, &request.grid)?;
    let export = build_export_table(parameters, request.export_kind, &request.grid)?;

    Ok(FitResponse {
        method: request.input.method(),
        parameters,
        metrics: reliability_metrics(parameters),
        curve,
        export,
        calibration,
        mle,
        sample: sample_summary,
    })
}

/// A saved curve evaluated for comparison.
#[derive(Debug, Clone)]
pub struct ComparedCurve {
    pub saved: SavedCurve,
    pub metrics: ReliabilityMetrics,
    pub series: CurveSeries,
}

/// Evaluate several saved curves independently (in parallel); order is preserved.
pub fn compare_curves(
    curves: &[SavedCurve],
    curve_type: CurveType,
    grid: &GridConfig,
) -> Result<Vec<ComparedCurve>, AppError> {
    curves
        .par_iter()
        .map(|saved| {
            let params = saved.parameters()?;
            let series = evaluate_curve(params, curve_type, grid)?;
            Ok(ComparedCurve {
                saved: saved.clone(),
                metrics: reliability_metrics(params),
                series,
            })
        })
        .collect()
}
