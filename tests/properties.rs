//! End-to-end checks of the fitting core through the public library API.

use weibull_fit::app::pipeline::{FitInput, FitRequest, run_fit};
use weibull_fit::data::quantile_sample;
use weibull_fit::domain::{CurveType, ExportKind, GridConfig, WeibullParameters};
use weibull_fit::error::FitError;
use weibull_fit::fit::{MleOptions, fit_from_points, fit_mle};
use weibull_fit::io::{CurveStore, parse_asset_csv, write_export_csv};
use weibull_fit::models::{build_export_table, cdf, evaluate_curve, hazard, pdf, quantile};

fn params(shape: f64, scale: f64) -> WeibullParameters {
    WeibullParameters::new(shape, scale).unwrap()
}

#[test]
fn cdf_is_monotone_with_correct_limits() {
    for p in [params(0.5, 3.0), params(1.0, 10.0), params(4.0, 0.2)] {
        let series = evaluate_curve(p, CurveType::Cdf, &GridConfig::with_points(500)).unwrap();
        assert!(series.values.windows(2).all(|w| w[1] >= w[0]));
        assert!(series.values.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(cdf(p, 0.0), 0.0);
        assert!(cdf(p, p.scale * 1e3) > 1.0 - 1e-9);
    }
}

#[test]
fn hazard_equals_density_over_survival() {
    let p = params(1.7, 12.0);
    let grid = GridConfig::with_points(200);
    let series = evaluate_curve(p, CurveType::Hazard, &grid).unwrap();
    for (&t, &h) in series.times.iter().zip(&series.values) {
        let survival = 1.0 - cdf(p, t);
        if survival < 1e-9 {
            continue;
        }
        let expected = pdf(p, t) / survival;
        assert!((h - expected).abs() <= 1e-6 * expected.max(1.0), "t={t} h={h} expected={expected}");
    }
    assert!(hazard(p, 0.0).is_finite());
}

#[test]
fn points_taken_from_a_curve_recover_it() {
    for (shape, scale) in [(1.7, 12.0), (0.6, 3.0), (3.5, 40.0), (1.0, 1.0)] {
        let p = params(shape, scale);
        let times = [0.25, 0.5, 0.75].map(|q| quantile(p, q).unwrap());
        let fitted = fit_from_points(times).unwrap();
        assert!((fitted.shape - shape).abs() / shape < 1e-3, "shape {shape} -> {}", fitted.shape);
        assert!((fitted.scale - scale).abs() / scale < 1e-3, "scale {scale} -> {}", fitted.scale);
    }
}

#[test]
fn one_two_three_years_fit_close_to_the_quartiles() {
    let fitted = fit_from_points([1.0, 2.0, 3.0]).unwrap();
    assert!((fitted.shape - 1.462).abs() < 0.01);
    assert!((fitted.scale - 2.483).abs() < 0.01);
    for (t, target) in [(1.0, 0.25), (2.0, 0.5), (3.0, 0.75)] {
        assert!((cdf(fitted, t) - target).abs() < 0.02);
    }
}

#[test]
fn out_of_order_points_are_rejected() {
    let err = fit_from_points([3.0, 2.0, 4.0]).unwrap_err();
    assert!(matches!(err, FitError::PointsOutOfOrder { .. }));
}

#[test]
fn single_lifetime_is_not_enough() {
    let err = fit_mle(&[5.0], &MleOptions::default()).unwrap_err();
    assert!(err.to_string().contains("at least 2 data points"));
}

#[test]
fn mle_recovers_generating_parameters() {
    let sample = quantile_sample(params(2.0, 10.0), 500);
    let fit = fit_mle(sample.values(), &MleOptions::default()).unwrap();
    assert!((fit.parameters.shape - 2.0).abs() < 0.3);
    assert!((fit.parameters.scale - 10.0).abs() < 1.0);

    // Refitting the same data gives the same answer.
    let again = fit_mle(sample.values(), &MleOptions::default()).unwrap();
    assert_eq!(fit, again);
}

#[test]
fn export_table_is_aligned_and_complete() {
    let table = build_export_table(params(2.0, 1.0), ExportKind::All, &GridConfig::with_points(5)).unwrap();
    assert_eq!(table.rows.len(), 5);
    assert_eq!(table.columns, vec![CurveType::Pdf, CurveType::Cdf, CurveType::Hazard]);
    for row in &table.rows {
        let f = row.density.unwrap();
        let big_f = row.cumulative_probability.unwrap();
        let h = row.hazard_rate.unwrap();
        assert!((h * (1.0 - big_f) - f).abs() < 1e-9);
    }
    assert!((table.rows[4].time - 3.0).abs() < 1e-12);
}

#[test]
fn csv_to_fit_to_export_and_store() {
    let csv = "\
asset_identifier,in_service_date,retirement_date
A1,2000-01-01,2010-01-01
A2,2001-06-15,2009-06-15
A3,1999-03-01,2014-03-01
A4,2005-01-01,
A5,2002-01-01,2011-07-01
";
    let ingested = parse_asset_csv(csv).unwrap();
    assert_eq!(ingested.assets.len(), 4);
    assert_eq!(ingested.in_service, 1);

    let resp = run_fit(&FitRequest {
        input: FitInput::Sample {
            sample: ingested.sample(),
            options: MleOptions::default(),
        },
        grid: GridConfig::with_points(25),
        curve_type: CurveType::Cdf,
        export_kind: ExportKind::Both,
    })
    .unwrap();
    assert!(resp.parameters.scale > 8.0 && resp.parameters.scale < 16.0);

    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("curve.csv");
    let sidecar = write_export_csv(&export_path, &resp.export).unwrap();
    let exported = std::fs::read_to_string(&export_path).unwrap();
    assert!(exported.starts_with("Time,Probability_Density,Cumulative_Probability\n"));
    assert_eq!(exported.lines().count(), 26);
    assert!(std::fs::read_to_string(sidecar).unwrap().starts_with("Parameter,Value\n"));

    let store = CurveStore::new(dir.path().join("curves.json"));
    store
        .save("fleet", "from csv", resp.method, resp.parameters)
        .unwrap();
    let reloaded = CurveStore::new(dir.path().join("curves.json")).get("fleet").unwrap();
    assert_eq!(reloaded.parameters().unwrap(), resp.parameters);
}
