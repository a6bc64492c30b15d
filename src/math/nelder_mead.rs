//! Bounded Nelder–Mead simplex minimizer.
//!
//! Derivative-free local search for small, smooth-ish objectives:
//!
//! - standard coefficients (reflection 1, expansion 2, contraction ½, shrink ½)
//! - initial simplex perturbs each coordinate of the start by 5%
//! - bounds are enforced by projecting every trial vertex back into the box
//! - convergence when both the simplex diameter (`xatol`) and the spread of
//!   objective values (`fatol`) are within tolerance
//!
//! The objective may return `+∞` to mark infeasible regions. `NaN` is treated
//! as `+∞` so it can never become the best vertex.
//!
//! Runs are fully deterministic: the same objective and start always yield the
//! same vertex sequence.

/// Relative perturbation for non-zero start coordinates.
const NONZERO_DELTA: f64 = 0.05;

/// Absolute perturbation for start coordinates equal to zero.
const ZERO_DELTA: f64 = 0.00025;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    pub max_iterations: usize,
    pub xatol: f64,
    pub fatol: f64,
    /// Per-coordinate `(lower, upper)` box. Coordinates without an entry are unbounded.
    pub bounds: Vec<(f64, f64)>,
}

/// Result of a minimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl NelderMead {
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self {
            max_iterations: 1000,
            xatol: 1e-4,
            fatol: 1e-4,
            bounds,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Minimize `objective` starting from `x0`.
    ///
    /// Never fails: an exhausted iteration budget is reported through
    /// `Minimum::converged = false`, with the best vertex seen so far.
    pub fn minimize<F>(&self, mut objective: F, x0: &[f64]) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_nan() { f64::INFINITY } else { v }
        };

        let n = x0.len();
        let start = self.project(x0.to_vec());

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let f_start = eval(&start);
        simplex.push((start.clone(), f_start));
        for k in 0..n {
            let mut vertex = start.clone();
            vertex[k] = if vertex[k] != 0.0 {
                vertex[k] * (1.0 + NONZERO_DELTA)
            } else {
                ZERO_DELTA
            };
            let vertex = self.project(vertex);
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0usize;
        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            if self.has_converged(&simplex) {
                let (x, value) = simplex.swap_remove(0);
                return Minimum {
                    x,
                    value,
                    iterations,
                    converged: true,
                };
            }
            if iterations >= self.max_iterations || n == 0 {
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].0.clone();
            let f_best = simplex[0].1;
            let f_second_worst = simplex[n - 1].1;
            let f_worst = simplex[n].1;

            let reflected = self.project(towards(&centroid, &worst, -REFLECTION));
            let f_reflected = eval(&reflected);

            if f_reflected < f_best {
                let expanded = self.project(towards(&centroid, &worst, -EXPANSION));
                let f_expanded = eval(&expanded);
                simplex[n] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < f_second_worst {
                simplex[n] = (reflected, f_reflected);
                continue;
            }

            if f_reflected < f_worst {
                let contracted = self.project(towards(&centroid, &reflected, CONTRACTION));
                let f_contracted = eval(&contracted);
                if f_contracted <= f_reflected {
                    simplex[n] = (contracted, f_contracted);
                    continue;
                }
            } else {
                let contracted = self.project(towards(&centroid, &worst, CONTRACTION));
                let f_contracted = eval(&contracted);
                if f_contracted < f_worst {
                    simplex[n] = (contracted, f_contracted);
                    continue;
                }
            }

            // Shrink every vertex towards the best one.
            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk = self.project(towards(&best, &vertex.0, SHRINK));
                let value = eval(&shrunk);
                *vertex = (shrunk, value);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (x, value) = simplex.swap_remove(0);
        Minimum {
            x,
            value,
            iterations,
            converged: false,
        }
    }

    fn project(&self, mut x: Vec<f64>) -> Vec<f64> {
        for (j, v) in x.iter_mut().enumerate() {
            if let Some(&(lo, hi)) = self.bounds.get(j) {
                // An inverted box (lo > hi) resolves to `hi`.
                *v = v.max(lo).min(hi);
            }
        }
        x
    }

    fn has_converged(&self, simplex: &[(Vec<f64>, f64)]) -> bool {
        let (best, f_best) = (&simplex[0].0, simplex[0].1);
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|(v, _)| v.iter().zip(best.iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let f_spread = simplex[1..]
            .iter()
            .map(|(_, f)| (f - f_best).abs())
            .fold(0.0_f64, |acc, d| if d.is_nan() { f64::INFINITY } else { acc.max(d) });
        x_spread <= self.xatol && f_spread <= self.fatol
    }
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to.iter()).map(|(a, b)| a + t * (b - a)).collect()
}
