//! Synthetic lifetime samples drawn from a known Weibull.
//!
//! Used by `wb mle --simulate-*` to demo the MLE fitter and to check that it
//! recovers the generating parameters. The RNG is seeded, so a given
//! `(parameters, n, seed)` always yields the same sample.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Weibull};
use tracing::debug;

use crate::domain::{LifetimeSample, WeibullParameters};
use crate::error::AppError;

/// Draw `n` lifetimes from `params`.
pub fn generate_sample(params: WeibullParameters, n: usize, seed: u64) -> Result<LifetimeSample, AppError> {
    if n == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    // rand_distr takes (scale, shape).
    let dist = Weibull::new(params.scale, params.shape)
        .map_err(|e| AppError::new(2, format!("Invalid Weibull distribution: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let values: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
    debug!(n, seed, shape = params.shape, scale = params.scale, "generated synthetic sample");

    // Draws of exactly zero are possible for tiny shapes; they are not lifetimes.
    Ok(LifetimeSample::from_durations(values))
}

/// Deterministic "perfect" sample: the `(i - 0.5) / n` quantiles of `params`.
pub fn quantile_sample(params: WeibullParameters, n: usize) -> LifetimeSample {
    let values = (1..=n)
        .map(|i| {
            let p = (i as f64 - 0.5) / n as f64;
            params.scale * (-(-p).ln_1p()).powf(1.0 / params.shape)
        })
        .collect();
    LifetimeSample::new(values)
}
