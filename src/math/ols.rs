//! Least squares solver.
//!
//! The point-based fitter solves a tiny linear regression in log-log space:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with `x_i = [ln t_i, 1]` and `y_i = ln(-ln(1 - p_i))`.
//!
//! Implementation choices:
//! - We use SVD so that a tall design matrix (more rows than columns) is fine.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Rank deficiency is *not* detected here: SVD returns the minimum-norm
//!   solution. Callers that need a unique slope check their column spread first.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = slope * x + intercept`; returns `(slope, intercept)`.
///
/// Returns `None` when fewer than two points are given or the `x` values have
/// no spread (the slope would not be identified).
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let mean = xs.iter().sum::<f64>() / n as f64;
    let spread = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    if !(spread.is_finite() && spread > 1e-18) {
        return None;
    }

    let mut data = Vec::with_capacity(n * 2);
    for &x in xs {
        data.push(x);
        data.push(1.0);
    }
    let design = DMatrix::from_row_slice(n, 2, &data);
    let target = DVector::from_row_slice(ys);

    let beta = solve_least_squares(&design, &target)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_slope_and_intercept() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [-1.0, 1.5, 4.0, 6.5];
        let (slope, intercept) = fit_line(&xs, &ys).unwrap();
        assert!((slope - 2.5).abs() < 1e-10);
        assert!((intercept + 1.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_rejects_constant_x() {
        assert!(fit_line(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0]).is_none());
    }
}
