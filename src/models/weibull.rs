//! Closed-form Weibull functions.
//!
//! With `z = t / λ`:
//!
//! - `F(t) = 1 - exp(-z^k)`
//! - `f(t) = (k/λ) z^(k-1) exp(-z^k)`
//! - `h(t) = f(t) / (1 - F(t)) = (k/λ) z^(k-1)`
//!
//! Numerical notes:
//! - `1 - exp(-x)` is computed as `-expm1(-x)` to keep precision in the early-life tail.
//! - The hazard uses its closed form rather than the ratio, so it stays finite
//!   far into the right tail where `1 - F(t)` underflows.
//! - At `t → 0` with `k < 1`, density and hazard diverge; the computed value
//!   (possibly `+∞` at exactly zero) is returned as-is.
//! - Negative times are outside the support: `F = f = h = 0`.

use statrs::function::gamma::gamma;

use crate::domain::{CurveType, ReliabilityMetrics, WeibullParameters};

/// Cumulative failure probability `F(t)`.
pub fn cdf(params: WeibullParameters, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let zk = (t / params.scale).powf(params.shape);
    -(-zk).exp_m1()
}

/// Survival probability `R(t) = 1 - F(t)`.
pub fn reliability(params: WeibullParameters, t: f64) -> f64 {
    if t <= 0.0 {
        return 1.0;
    }
    (-(t / params.scale).powf(params.shape)).exp()
}

/// Probability density `f(t)`.
pub fn pdf(params: WeibullParameters, t: f64) -> f64 {
    if t < 0.0 {
        return 0.0;
    }
    let z = t / params.scale;
    let k = params.shape;
    (k / params.scale) * z.powf(k - 1.0) * (-z.powf(k)).exp()
}

/// Instantaneous failure rate `h(t)`.
pub fn hazard(params: WeibullParameters, t: f64) -> f64 {
    if t < 0.0 {
        return 0.0;
    }
    let z = t / params.scale;
    let k = params.shape;
    (k / params.scale) * z.powf(k - 1.0)
}

/// Evaluate the selected curve at `t`.
pub fn evaluate(curve_type: CurveType, params: WeibullParameters, t: f64) -> f64 {
    match curve_type {
        CurveType::Pdf => pdf(params, t),
        CurveType::Cdf => cdf(params, t),
        CurveType::Hazard => hazard(params, t),
    }
}

/// Time by which `percent`% of the population is expected to have failed.
///
/// `B_p = λ (-ln(1 - p/100))^(1/k)`. Returns `None` unless `0 < percent < 100`.
pub fn b_life(params: WeibullParameters, percent: f64) -> Option<f64> {
    if !(percent > 0.0 && percent < 100.0) {
        return None;
    }
    let p = percent / 100.0;
    Some(params.scale * (-(-p).ln_1p()).powf(1.0 / params.shape))
}

/// Inverse CDF: the time at which `F(t) = p`.
pub fn quantile(params: WeibullParameters, p: f64) -> Option<f64> {
    b_life(params, p * 100.0)
}

/// Mean time to failure, `λ Γ(1 + 1/k)`.
pub fn mttf(params: WeibullParameters) -> f64 {
    params.scale * gamma(1.0 + 1.0 / params.shape)
}

/// MTTF, B10, B50 and characteristic life.
pub fn reliability_metrics(params: WeibullParameters) -> ReliabilityMetrics {
    ReliabilityMetrics {
        mttf: mttf(params),
        b10: params.scale * (-(-0.10_f64).ln_1p()).powf(1.0 / params.shape),
        b50: params.scale * 2.0_f64.ln().powf(1.0 / params.shape),
        characteristic_life: params.scale,
    }
}

/// Plain-language reading of the shape parameter.
pub fn failure_behavior(shape: f64) -> &'static str {
    const EPS: f64 = 1e-9;
    if shape < 1.0 - EPS {
        "decreasing failure rate (early-life failures)"
    } else if shape <= 1.0 + EPS {
        "constant failure rate (random failures)"
    } else {
        "increasing failure rate (wear-out)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(shape: f64, scale: f64) -> WeibullParameters {
        WeibullParameters::new(shape, scale).unwrap()
    }

    #[test]
    fn cdf_at_scale_is_one_minus_inverse_e() {
        for &k in &[0.5, 1.0, 2.0, 7.5] {
            let p = params(k, 4.0);
            let expected = 1.0 - (-1.0_f64).exp();
            assert!((cdf(p, 4.0) - expected).abs() < 1e-12, "k={k}");
        }
    }

    #[test]
    fn shape_one_is_exponential() {
        let p = params(1.0, 2.0);
        for &t in &[0.1, 1.0, 3.0] {
            assert!((hazard(p, t) - 0.5).abs() < 1e-12);
            assert!((pdf(p, t) - 0.5 * (-t / 2.0).exp()).abs() < 1e-12);
        }
    }

    #[test]
    fn small_shape_diverges_without_panicking() {
        let p = params(0.5, 1.0);
        assert_eq!(pdf(p, 0.0), f64::INFINITY);
        assert_eq!(hazard(p, 0.0), f64::INFINITY);
        assert!(pdf(p, 1e-12).is_finite());
        assert!(pdf(p, 1e-12) > 1e5);
        assert_eq!(cdf(p, 0.0), 0.0);
    }

    #[test]
    fn negative_time_is_outside_support() {
        let p = params(2.0, 1.0);
        assert_eq!(cdf(p, -1.0), 0.0);
        assert_eq!(pdf(p, -1.0), 0.0);
        assert_eq!(hazard(p, -1.0), 0.0);
        assert_eq!(reliability(p, -1.0), 1.0);
    }

    #[test]
    fn b_life_inverts_cdf() {
        let p = params(2.3, 12.0);
        let b10 = b_life(p, 10.0).unwrap();
        assert!((cdf(p, b10) - 0.10).abs() < 1e-12);
        assert!(b_life(p, 0.0).is_none());
        assert!(b_life(p, 100.0).is_none());
    }

    #[test]
    fn mttf_matches_known_values() {
        // Exponential: mean = scale.
        assert!((mttf(params(1.0, 5.0)) - 5.0).abs() < 1e-9);
        // Rayleigh (k = 2): mean = λ √π / 2.
        let expected = 3.0 * std::f64::consts::PI.sqrt() / 2.0;
        assert!((mttf(params(2.0, 3.0)) - expected).abs() < 1e-9);
    }

    #[test]
    fn metrics_agree_with_b_life() {
        let p = params(1.7, 25.0);
        let m = reliability_metrics(p);
        assert!((m.b10 - b_life(p, 10.0).unwrap()).abs() < 1e-9);
        assert!((m.b50 - b_life(p, 50.0).unwrap()).abs() < 1e-9);
        assert!((cdf(p, m.b50) - 0.5).abs() < 1e-12);
        assert_eq!(m.characteristic_life, 25.0);
    }

    #[test]
    fn behavior_follows_shape() {
        assert!(failure_behavior(0.5).starts_with("decreasing"));
        assert!(failure_behavior(1.0).starts_with("constant"));
        assert!(failure_behavior(3.0).starts_with("increasing"));
    }
}
