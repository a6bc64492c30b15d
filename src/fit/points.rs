//! Point-based fitting from cumulative-probability calibration points.
//!
//! The Weibull CDF is linear after a log-log transform:
//!
//! ```text
//! ln(-ln(1 - p)) = k ln(t) - k ln(λ)
//! ```
//!
//! so a least-squares line through `(ln t_i, ln(-ln(1 - p_i)))` gives the shape
//! as its slope and the scale from its intercept. All points enter the
//! regression (not just the outer two).
//!
//! Three user-supplied ages rarely lie exactly on one Weibull curve. The
//! regression spreads the misfit in log-log space, which over-weights the
//! tails; a short refinement then minimizes the largest probability error
//! `max_i |F(t_i) - p_i|` starting from the regression estimate. When the
//! points are exactly Weibull the regression is already exact and the
//! refinement leaves it unchanged.

use tracing::debug;

use crate::domain::{CALIBRATION_PROBABILITIES, CalibrationPoint, WeibullParameters};
use crate::error::FitError;
use crate::math::{NelderMead, fit_line};
use crate::models::cdf;

/// Refinement search box, as a factor around the regression estimate.
const REFINE_SPAN: f64 = 4.0;

const REFINE_MAX_ITER: usize = 1000;

/// Fit from the ages at which 25%, 50% and 75% of assets are expected to have failed.
pub fn fit_from_points(times_ascending: [f64; 3]) -> Result<WeibullParameters, FitError> {
    fit_calibration_points(&calibration_points(times_ascending))
}

/// Pair ages with the fixed 25/50/75% probabilities.
pub fn calibration_points(times: [f64; 3]) -> [CalibrationPoint; 3] {
    [
        CalibrationPoint::new(times[0], CALIBRATION_PROBABILITIES[0]),
        CalibrationPoint::new(times[1], CALIBRATION_PROBABILITIES[1]),
        CalibrationPoint::new(times[2], CALIBRATION_PROBABILITIES[2]),
    ]
}

/// Regression fit followed by the max-error refinement.
pub fn fit_calibration_points(points: &[CalibrationPoint]) -> Result<WeibullParameters, FitError> {
    let linear = fit_calibration_points_linear(points)?;
    let linear_err = max_probability_error(points, linear.shape, linear.scale);

    let nm = NelderMead::new(vec![
        (linear.shape / REFINE_SPAN, linear.shape * REFINE_SPAN),
        (linear.scale / REFINE_SPAN, linear.scale * REFINE_SPAN),
    ])
    .with_max_iterations(REFINE_MAX_ITER)
    .with_tolerances(1e-10, 1e-12);

    let min = nm.minimize(
        |x| max_probability_error(points, x[0], x[1]),
        &[linear.shape, linear.scale],
    );

    match WeibullParameters::new(min.x[0], min.x[1]) {
        Ok(refined) if min.value < linear_err => {
            debug!(
                linear_shape = linear.shape,
                linear_scale = linear.scale,
                linear_err,
                shape = refined.shape,
                scale = refined.scale,
                max_err = min.value,
                iterations = min.iterations,
                "refined point fit"
            );
            Ok(refined)
        }
        _ => Ok(linear),
    }
}

/// Closed-form log-log least squares only.
pub fn fit_calibration_points_linear(
    points: &[CalibrationPoint],
) -> Result<WeibullParameters, FitError> {
    validate_points(points)?;

    let xs: Vec<f64> = points.iter().map(|p| p.time.ln()).collect();
    let ys: Vec<f64> = points
        .iter()
        .map(|p| (-(-p.cumulative_probability).ln_1p()).ln())
        .collect();

    let (slope, intercept) = fit_line(&xs, &ys).ok_or_else(|| {
        FitError::DegenerateFit("calibration ages are all identical, the shape is undefined.".to_string())
    })?;

    let shape = slope;
    if !(shape.is_finite() && shape > 0.0) {
        return Err(FitError::DegenerateFit(format!(
            "implied shape {shape} is not positive."
        )));
    }

    let scale = (-intercept / shape).exp();
    if !(scale.is_finite() && scale > 0.0) {
        return Err(FitError::DegenerateFit(format!(
            "implied scale {scale} is not positive and finite."
        )));
    }

    WeibullParameters::new(shape, scale)
}

fn validate_points(points: &[CalibrationPoint]) -> Result<(), FitError> {
    if points.len() < 2 {
        return Err(FitError::InsufficientData {
            have: points.len(),
            need: 2,
        });
    }

    for (i, p) in points.iter().enumerate() {
        if !(p.time.is_finite() && p.time > 0.0) {
            return Err(FitError::InvalidCalibrationPoint(format!(
                "age #{} must be positive, got {}.",
                i + 1,
                p.time
            )));
        }
        let prob = p.cumulative_probability;
        if !(prob > 0.0 && prob < 1.0) {
            return Err(FitError::InvalidCalibrationPoint(format!(
                "probability #{} must lie strictly between 0 and 1, got {prob}.",
                i + 1
            )));
        }
    }

    for (i, w) in points.windows(2).enumerate() {
        if w[1].time < w[0].time {
            return Err(FitError::PointsOutOfOrder {
                index: i + 2,
                previous: w[0].time,
                time: w[1].time,
            });
        }
        if w[1].cumulative_probability < w[0].cumulative_probability {
            return Err(FitError::InvalidCalibrationPoint(
                "cumulative probabilities must be non-decreasing.".to_string(),
            ));
        }
    }

    Ok(())
}

fn max_probability_error(points: &[CalibrationPoint], shape: f64, scale: f64) -> f64 {
    let Ok(params) = WeibullParameters::new(shape, scale) else {
        return f64::INFINITY;
    };
    points
        .iter()
        .map(|p| (cdf(params, p.time) - p.cumulative_probability).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quantile;

    #[test]
    fn recovers_known_parameters_from_exact_points() {
        for &(k, lambda) in &[(1.7, 12.0), (0.6, 3.0), (3.5, 40.0), (1.0, 1.0)] {
            let truth = WeibullParameters::new(k, lambda).unwrap();
            let times = CALIBRATION_PROBABILITIES.map(|p| quantile(truth, p).unwrap());
            let fit = fit_from_points(times).unwrap();
            assert!((fit.shape - k).abs() / k < 1e-3, "shape {} vs {k}", fit.shape);
            assert!((fit.scale - lambda).abs() / lambda < 1e-3, "scale {} vs {lambda}", fit.scale);
        }
    }

    #[test]
    fn one_two_three_reproduces_probabilities() {
        let fit = fit_from_points([1.0, 2.0, 3.0]).unwrap();
        assert!(fit.shape > 1.4 && fit.shape < 2.5, "shape={}", fit.shape);
        for (t, p) in [(1.0, 0.25), (2.0, 0.50), (3.0, 0.75)] {
            let got = cdf(fit, t);
            assert!((got - p).abs() < 0.02, "F({t})={got}, expected ~{p}");
        }
    }

    #[test]
    fn refinement_never_worsens_the_regression() {
        let points = calibration_points([1.0, 2.0, 3.0]);
        let linear = fit_calibration_points_linear(&points).unwrap();
        let refined = fit_calibration_points(&points).unwrap();
        assert!(
            max_probability_error(&points, refined.shape, refined.scale)
                <= max_probability_error(&points, linear.shape, linear.scale)
        );
    }

    #[test]
    fn out_of_order_points_are_rejected() {
        let err = fit_from_points([3.0, 2.0, 4.0]).unwrap_err();
        assert!(matches!(err, FitError::PointsOutOfOrder { index: 2, .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn identical_ages_are_degenerate() {
        let err = fit_from_points([2.0, 2.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::DegenerateFit(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn non_positive_age_is_rejected() {
        let err = fit_from_points([0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::InvalidCalibrationPoint(_)));
    }

    #[test]
    fn partially_tied_ages_still_fit() {
        let fit = fit_from_points([2.0, 2.0, 5.0]).unwrap();
        assert!(fit.shape.is_finite() && fit.shape > 0.0);
        assert!(fit.scale.is_finite() && fit.scale > 0.0);
    }
}
