//! Weibull negative log-likelihood.
//!
//! For a sample `t_1..t_n`:
//!
//! ```text
//! ln L(k, λ) = n ln k - n k ln λ + (k - 1) Σ ln t_i - Σ (t_i / λ)^k
//! ```
//!
//! The optimizer minimizes `-ln L`. Invalid parameters and numerical
//! overflow both map to `+∞`, which the minimizer treats as "never go here".

/// Lifetimes are floored at this value before use.
pub const LIFETIME_FLOOR: f64 = 1e-10;

/// `-ln L(shape, scale)` for a sample.
///
/// Returns `+∞` for non-positive parameters, an empty sample, or any
/// non-finite intermediate.
pub fn negative_log_likelihood(shape: f64, scale: f64, lifetimes: &[f64]) -> f64 {
    WeibullLikelihood::new(lifetimes).negative_log_likelihood(shape, scale)
}

/// Likelihood surface over a fixed sample.
///
/// `Σ ln t_i` does not depend on the parameters, so it is computed once and
/// reused across the optimizer's evaluations.
#[derive(Debug, Clone)]
pub struct WeibullLikelihood {
    lifetimes: Vec<f64>,
    sum_ln: f64,
}

impl WeibullLikelihood {
    pub fn new(lifetimes: &[f64]) -> Self {
        let lifetimes: Vec<f64> = lifetimes.iter().map(|&t| t.max(LIFETIME_FLOOR)).collect();
        let sum_ln = lifetimes.iter().map(|t| t.ln()).sum();
        Self { lifetimes, sum_ln }
    }

    pub fn negative_log_likelihood(&self, shape: f64, scale: f64) -> f64 {
        if !(shape > 0.0 && scale > 0.0) || self.lifetimes.is_empty() {
            return f64::INFINITY;
        }

        let n = self.lifetimes.len() as f64;
        let sum_pow: f64 = self
            .lifetimes
            .iter()
            .map(|&t| (t / scale).powf(shape))
            .sum();

        let log_l = n * shape.ln() - n * shape * scale.ln() + (shape - 1.0) * self.sum_ln - sum_pow;
        if log_l.is_finite() {
            -log_l
        } else {
            f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeibullParameters;
    use crate::models::pdf;

    #[test]
    fn matches_sum_of_log_densities() {
        let sample = [0.7, 1.3, 2.2, 4.0];
        let (k, lambda) = (1.6, 2.5);
        let params = WeibullParameters::new(k, lambda).unwrap();
        let expected: f64 = -sample.iter().map(|&t| pdf(params, t).ln()).sum::<f64>();
        let got = negative_log_likelihood(k, lambda, &sample);
        assert!((got - expected).abs() < 1e-10, "got={got} expected={expected}");
    }

    #[test]
    fn invalid_parameters_are_infinitely_bad() {
        let sample = [1.0, 2.0];
        assert_eq!(negative_log_likelihood(0.0, 1.0, &sample), f64::INFINITY);
        assert_eq!(negative_log_likelihood(1.0, -1.0, &sample), f64::INFINITY);
        assert_eq!(negative_log_likelihood(f64::NAN, 1.0, &sample), f64::INFINITY);
        assert_eq!(negative_log_likelihood(1.0, 1.0, &[]), f64::INFINITY);
    }

    #[test]
    fn overflow_maps_to_infinity() {
        // (1e6 / 1e-3)^50 overflows.
        let v = negative_log_likelihood(50.0, 1e-3, &[1e6, 2e6]);
        assert_eq!(v, f64::INFINITY);
    }

    #[test]
    fn zero_lifetime_is_floored() {
        let v = negative_log_likelihood(2.0, 1.0, &[0.0, 1.0]);
        assert!(v.is_finite());
    }
}
