//! Sample statistics used by the fitters.

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is a fraction in `[0, 1]`. The rank is `q * (n - 1)` on the sorted
/// sample, so `q = 0` is the minimum and `q = 1` the maximum.
///
/// Returns `None` for an empty sample, a `q` outside `[0, 1]`, or non-finite values.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted_finite(values)?;
    percentile_sorted(&sorted, q)
}

/// Several percentiles of the same sample (sorted once).
pub fn percentiles<const N: usize>(values: &[f64], qs: [f64; N]) -> Option<[f64; N]> {
    let sorted = sorted_finite(values)?;
    let mut out = [0.0; N];
    for (slot, q) in out.iter_mut().zip(qs) {
        *slot = percentile_sorted(&sorted, q)?;
    }
    Some(out)
}

fn sorted_finite(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let rank = q * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 1.0), Some(4.0));
        // rank = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert!((percentile(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((percentile(&v, 0.5).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn percentiles_match_single_calls() {
        let v = [10.0, 2.0, 7.0, 5.0, 1.0];
        let [p25, p50, p75] = percentiles(&v, [0.25, 0.5, 0.75]).unwrap();
        assert_eq!(p25, percentile(&v, 0.25).unwrap());
        assert_eq!(p50, 5.0);
        assert_eq!(p75, percentile(&v, 0.75).unwrap());
    }

    #[test]
    fn percentile_rejects_bad_input() {
        assert!(percentile(&[], 0.5).is_none());
        assert!(percentile(&[1.0], 1.5).is_none());
        assert!(percentile(&[1.0, f64::NAN], 0.5).is_none());
    }
}
