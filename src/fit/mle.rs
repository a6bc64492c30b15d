//! Maximum-likelihood fit of a lifetime sample.
//!
//! Steps:
//!
//! 1. validate the sample (size, positivity)
//! 2. derive a starting point from the sample quartiles
//! 3. minimize the negative log-likelihood with a bounded Nelder–Mead search
//!
//! A run that exhausts its iteration budget, or lands on non-finite
//! parameters, is an error; the unconverged point is never returned.

use tracing::{debug, warn};

use crate::domain::{LifetimeSample, WeibullParameters};
use crate::error::FitError;
use crate::fit::likelihood::WeibullLikelihood;
use crate::math::{NelderMead, percentiles};

/// Initial-shape clamp.
const INITIAL_SHAPE_RANGE: (f64, f64) = (0.5, 5.0);

/// Lower bound for the scale search.
const SCALE_LOWER_BOUND: f64 = 0.1;

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MleOptions {
    pub max_iterations: usize,
    /// Shape search box.
    pub shape_bounds: (f64, f64),
    /// Scale search box upper end, as a multiple of the largest observation.
    pub scale_upper_factor: f64,
    /// Simplex size and objective spread at which the search stops.
    pub tolerance: f64,
}

impl Default for MleOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            shape_bounds: (0.1, 50.0),
            scale_upper_factor: 2.0,
            tolerance: 1e-4,
        }
    }
}

/// Result of an MLE run, with diagnostics for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct MleFit {
    pub parameters: WeibullParameters,
    /// Quartile-based starting point `(shape, scale)`.
    pub initial_guess: (f64, f64),
    pub negative_log_likelihood: f64,
    pub iterations: usize,
    pub n: usize,
    /// The estimate sits on an edge of the search box, so the unconstrained
    /// optimum may lie outside it.
    pub on_bound: bool,
}

/// Fit a sample with default options.
pub fn fit_from_sample(sample: &LifetimeSample) -> Result<WeibullParameters, FitError> {
    fit_mle(sample.values(), &MleOptions::default()).map(|fit| fit.parameters)
}

/// Quartile-based starting point.
///
/// `k0 = ln(ln 4) / ln(p75 / p25)` clamped to `[0.5, 5]`, then
/// `λ0 = p50 / (ln 2)^(1 / k0)`. Returns `None` for an empty or non-finite sample.
pub fn initial_guess(lifetimes: &[f64]) -> Option<(f64, f64)> {
    let [p25, p50, p75] = percentiles(lifetimes, [0.25, 0.50, 0.75])?;

    let raw = 4.0_f64.ln().ln() / (p75 / p25).ln();
    // `min` then `max` so an infinite or NaN ratio still lands in range.
    let shape = raw.min(INITIAL_SHAPE_RANGE.1).max(INITIAL_SHAPE_RANGE.0);
    let scale = p50 / 2.0_f64.ln().powf(1.0 / shape);
    Some((shape, scale))
}

/// Fit a Weibull distribution by maximum likelihood.
pub fn fit_mle(lifetimes: &[f64], options: &MleOptions) -> Result<MleFit, FitError> {
    if lifetimes.len() < 2 {
        return Err(FitError::InsufficientData {
            have: lifetimes.len(),
            need: 2,
        });
    }
    if let Some((index, &value)) = lifetimes
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        return Err(FitError::NonPositiveLifetime {
            index: index + 1,
            value,
        });
    }

    let (shape0, scale0) = initial_guess(lifetimes).ok_or(FitError::InsufficientData {
        have: lifetimes.len(),
        need: 2,
    })?;

    let max_obs = lifetimes.iter().copied().fold(0.0_f64, f64::max);
    let scale_hi = options.scale_upper_factor * max_obs;
    let mut scale_lo = SCALE_LOWER_BOUND;
    if scale_hi <= scale_lo {
        scale_lo = scale_hi * 1e-3;
        warn!(
            max_observation = max_obs,
            scale_lower = scale_lo,
            "lifetimes are very small; lowering the scale search bound"
        );
    }

    debug!(n = lifetimes.len(), shape0, scale0, scale_lo, scale_hi, "mle initial guess");

    let surface = WeibullLikelihood::new(lifetimes);
    let nm = NelderMead::new(vec![options.shape_bounds, (scale_lo, scale_hi)])
        .with_max_iterations(options.max_iterations)
        .with_tolerances(options.tolerance, options.tolerance);
    let min = nm.minimize(|x| surface.negative_log_likelihood(x[0], x[1]), &[shape0, scale0]);

    debug!(
        shape = min.x[0],
        scale = min.x[1],
        nll = min.value,
        iterations = min.iterations,
        converged = min.converged,
        "mle optimizer finished"
    );

    if !min.converged {
        return Err(FitError::NotConverged {
            iterations: min.iterations,
            reason: "maximum number of iterations reached".to_string(),
        });
    }

    let (shape, scale) = (min.x[0], min.x[1]);
    if !(shape.is_finite() && scale.is_finite() && min.value.is_finite()) {
        return Err(FitError::NonFiniteResult { shape, scale });
    }
    let parameters =
        WeibullParameters::new(shape, scale).map_err(|_| FitError::NonFiniteResult { shape, scale })?;

    let scale_bounds = (scale_lo, scale_hi);
    let on_bound = touches_bound(&min.x, &[options.shape_bounds, scale_bounds]);
    if on_bound {
        warn!(
            shape,
            scale,
            shape_bounds = ?options.shape_bounds,
            scale_bounds = ?scale_bounds,
            "mle estimate sits on a search bound"
        );
    }

    Ok(MleFit {
        parameters,
        initial_guess: (shape0, scale0),
        negative_log_likelihood: min.value,
        iterations: min.iterations,
        n: lifetimes.len(),
        on_bound,
    })
}

/// Within a millionth of the box width of either edge.
fn touches_bound(x: &[f64], bounds: &[(f64, f64)]) -> bool {
    x.iter().zip(bounds).any(|(&v, &(lo, hi))| {
        let tol = (hi - lo).abs() * 1e-6;
        v - lo <= tol || hi - v <= tol
    })
}
