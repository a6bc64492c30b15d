//! Curve sampling and export tables.
//!
//! Every curve for a parameter pair is sampled on the same grid:
//! `num_points` evenly spaced times from `min_time` to `scale * max_time_multiplier`.
//! Sharing the grid is what keeps the columns of an export table aligned.

use crate::domain::{
    CurveSeries, CurveType, ExportKind, ExportRow, ExportTable, GridConfig, WeibullParameters,
};
use crate::error::FitError;
use crate::models::weibull::evaluate;

/// Evenly spaced time grid for a parameter pair.
pub fn time_grid(params: WeibullParameters, grid: &GridConfig) -> Result<Vec<f64>, FitError> {
    if grid.num_points == 0 {
        return Err(FitError::InvalidGrid("number of points must be >= 1.".to_string()));
    }
    if !(grid.max_time_multiplier.is_finite() && grid.max_time_multiplier > 0.0) {
        return Err(FitError::InvalidGrid(format!(
            "max time multiplier must be finite and > 0, got {}.",
            grid.max_time_multiplier
        )));
    }

    let t0 = grid.min_time;
    let t1 = params.scale * grid.max_time_multiplier;
    if !(t0.is_finite() && t0 >= 0.0 && t1.is_finite() && t1 > t0) {
        return Err(FitError::InvalidGrid(format!(
            "grid range [{t0}, {t1}] is empty or non-finite."
        )));
    }

    let n = grid.num_points;
    if n == 1 {
        return Ok(vec![t0]);
    }

    let step = (t1 - t0) / (n as f64 - 1.0);
    let mut out = Vec::with_capacity(n);
    for i in 0..n - 1 {
        out.push(t0 + step * i as f64);
    }
    // Pin the last point so rounding never overshoots the upper end.
    out.push(t1);
    Ok(out)
}

/// Sample one curve over the grid.
pub fn evaluate_curve(
    params: WeibullParameters,
    curve_type: CurveType,
    grid: &GridConfig,
) -> Result<CurveSeries, FitError> {
    let times = time_grid(params, grid)?;
    let values = times.iter().map(|&t| evaluate(curve_type, params, t)).collect();
    Ok(CurveSeries {
        curve_type,
        times,
        values,
    })
}

/// Sample the requested curves on one grid and package them row by row.
pub fn build_export_table(
    params: WeibullParameters,
    kind: ExportKind,
    grid: &GridConfig,
) -> Result<ExportTable, FitError> {
    let columns = kind.curve_types().to_vec();
    let times = time_grid(params, grid)?;

    let rows = times
        .iter()
        .map(|&t| {
            let mut row = ExportRow {
                time: t,
                density: None,
                cumulative_probability: None,
                hazard_rate: None,
            };
            for &curve_type in &columns {
                let v = Some(evaluate(curve_type, params, t));
                match curve_type {
                    CurveType::Pdf => row.density = v,
                    CurveType::Cdf => row.cumulative_probability = v,
                    CurveType::Hazard => row.hazard_rate = v,
                }
            }
            row
        })
        .collect();

    Ok(ExportTable {
        parameters: params,
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weibull::cdf;

    fn params(shape: f64, scale: f64) -> WeibullParameters {
        WeibullParameters::new(shape, scale).unwrap()
    }

    #[test]
    fn grid_spans_epsilon_to_three_scales() {
        let p = params(2.0, 4.0);
        let t = time_grid(p, &GridConfig::default()).unwrap();
        assert_eq!(t.len(), 1000);
        assert!(t[0] > 0.0 && t[0] < 1e-3);
        assert_eq!(*t.last().unwrap(), 12.0);
        assert!(t.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn grid_multiplier_is_configurable() {
        let p = params(1.0, 2.0);
        let grid = GridConfig {
            num_points: 11,
            max_time_multiplier: 5.0,
            min_time: 0.0,
        };
        let t = time_grid(p, &grid).unwrap();
        assert_eq!(t.len(), 11);
        assert_eq!(t[0], 0.0);
        assert!((t[1] - 1.0).abs() < 1e-12);
        assert_eq!(t[10], 10.0);
    }

    #[test]
    fn grid_rejects_bad_settings() {
        let p = params(1.0, 2.0);
        assert!(time_grid(p, &GridConfig::with_points(0)).is_err());
        let grid = GridConfig {
            max_time_multiplier: -1.0,
            ..GridConfig::default()
        };
        assert!(matches!(time_grid(p, &grid), Err(FitError::InvalidGrid(_))));
    }

    #[test]
    fn cdf_curve_is_monotone_on_grid() {
        for &k in &[0.4, 1.0, 3.5] {
            let p = params(k, 7.0);
            let grid = GridConfig::default();
            let series = evaluate_curve(p, CurveType::Cdf, &grid).unwrap();
            assert!(series.values.windows(2).all(|w| w[1] >= w[0]), "k={k}");
            assert_eq!(series.values[0], cdf(p, grid.min_time));
        }
    }

    #[test]
    fn cdf_vanishes_towards_zero() {
        // Small shapes approach zero slowly: F(1e-6) is ≈ 1.8e-3 for k = 0.4.
        for &k in &[0.4, 1.0, 3.5] {
            let p = params(k, 7.0);
            let values: Vec<f64> = (1..=12).map(|e| cdf(p, 10f64.powi(-3 * e))).collect();
            assert!(values.windows(2).all(|w| w[1] < w[0]), "k={k}");
            assert!(values[11] < 1e-12, "k={k} F={}", values[11]);
        }
    }

    #[test]
    fn export_table_has_only_requested_columns() {
        let table = build_export_table(params(1.5, 2.0), ExportKind::Cdf, &GridConfig::with_points(3)).unwrap();
        assert_eq!(table.columns, vec![CurveType::Cdf]);
        assert_eq!(table.rows.len(), 3);
        for row in &table.rows {
            assert!(row.cumulative_probability.is_some());
            assert!(row.density.is_none());
            assert!(row.hazard_rate.is_none());
        }
    }
}
