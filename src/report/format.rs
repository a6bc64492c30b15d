//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation
//! - output changes are localized

use crate::app::pipeline::{ComparedCurve, FitResponse};
use crate::domain::{SampleSummary, SavedCurve};
use crate::fmea::{Characteristic, CharacteristicKind, FmeaReport, summarize_mode};
use crate::io::ingest::IngestedAssets;
use crate::models::failure_behavior;

/// Parameters, reliability figures and mode-specific diagnostics.
pub fn format_fit_summary(resp: &FitResponse) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Weibull fit: {} ===\n", resp.method.display_name()));

    if let Some(sample) = &resp.sample {
        out.push_str(&format_sample_summary(sample));
    }

    out.push_str("\nFitted parameters:\n");
    out.push_str(&format!("- Shape (k): {:.3}\n", resp.parameters.shape));
    out.push_str(&format!("- Scale (λ): {:.3}\n", resp.parameters.scale));
    out.push_str(&format!("- Behavior : {}\n", failure_behavior(resp.parameters.shape)));

    out.push_str("\nReliability:\n");
    out.push_str(&format!("- MTTF               : {:.3}\n", resp.metrics.mttf));
    out.push_str(&format!("- B10 life           : {:.3}\n", resp.metrics.b10));
    out.push_str(&format!("- Median life (B50)  : {:.3}\n", resp.metrics.b50));
    out.push_str(&format!("- Characteristic life: {:.3}\n", resp.metrics.characteristic_life));

    if !resp.calibration.is_empty() {
        out.push_str("\nCalibration check:\n");
        out.push_str(&format!("{:>10} {:>8} {:>8} {:>8}\n", "age", "target", "fitted", "error"));
        for c in &resp.calibration {
            let target = c.point.cumulative_probability;
            out.push_str(&format!(
                "{:>10.3} {:>7.1}% {:>7.1}% {:>+7.2}%\n",
                c.point.time,
                target * 100.0,
                c.fitted_probability * 100.0,
                (c.fitted_probability - target) * 100.0
            ));
        }
    }

    if let Some(mle) = &resp.mle {
        out.push_str("\nOptimizer:\n");
        out.push_str(&format!(
            "- initial guess: k={:.3}, λ={:.3}\n",
            mle.initial_guess.0, mle.initial_guess.1
        ));
        out.push_str(&format!(
            "- iterations={} | -lnL={:.4}\n",
            mle.iterations, mle.negative_log_likelihood
        ));
        if mle.on_bound {
            out.push_str("- warning: estimate sits on a search bound; the true optimum may lie outside it\n");
        }
    }

    out
}

pub fn format_sample_summary(sample: &SampleSummary) -> String {
    format!(
        "Data: n={} | mean={:.2} | range=[{:.2}, {:.2}] years\n",
        sample.n, sample.mean, sample.min, sample.max
    )
}

/// Counts and skipped-row diagnostics from an asset CSV.
pub fn format_ingest_report(ingested: &IngestedAssets) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rows: read={} | used={} | in service={} | skipped={}\n",
        ingested.rows_read,
        ingested.assets.len(),
        ingested.in_service,
        ingested.row_errors.len()
    ));
    for err in &ingested.row_errors {
        let id = err.id.as_deref().unwrap_or("-");
        out.push_str(&format!("  line {} [{}]: {}\n", err.line, id, err.message));
    }
    out
}

pub fn format_saved_list(curves: &[SavedCurve]) -> String {
    if curves.is_empty() {
        return "No curves saved yet. Use --save NAME on any fit command.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:<26} {:>9} {:>11}  {}\n",
        "name", "method", "shape", "scale", "saved"
    ));
    for c in curves {
        out.push_str(&format!(
            "{:<24} {:<26} {:>9.3} {:>11.3}  {}\n",
            c.name,
            c.method.display_name(),
            c.shape,
            c.scale,
            c.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    out
}

pub fn format_saved_curve(curve: &SavedCurve) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({})\n",
        curve.name,
        curve.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    if !curve.description.is_empty() {
        out.push_str(&format!("Description: {}\n", curve.description));
    }
    out.push_str(&format!("Method: {}\n", curve.method.display_name()));
    out.push_str(&format!("Shape (k): {:.3}\n", curve.shape));
    out.push_str(&format!("Scale (λ): {:.3}\n", curve.scale));
    out
}

pub fn format_comparison(curves: &[ComparedCurve]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>9} {:>11} {:>11} {:>11}\n",
        "name", "shape", "scale", "MTTF", "B10"
    ));
    for c in curves {
        out.push_str(&format!(
            "{:<24} {:>9.3} {:>11.3} {:>11.3} {:>11.3}\n",
            c.saved.name, c.saved.shape, c.saved.scale, c.metrics.mttf, c.metrics.b10
        ));
    }
    out
}

/// FMEA table ranked by RPN, with a curve summary per mode.
pub fn format_fmea(report: &FmeaReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== FMEA: {} ({}) ===\n", report.asset_type, report.source));
    for (k, v) in &report.characteristics {
        out.push_str(&format!("- {k}: {v}\n"));
    }
    out.push('\n');

    out.push_str(&format!(
        "{:<34} {:>3} {:>3} {:>3} {:>5} {:>6} {:>10} {:>10} {:>10}\n",
        "failure mode", "S", "O", "D", "RPN", "β", "η (h)", "MTTF (h)", "B10 (h)"
    ));
    for mode in report.ranked() {
        let (mttf, b10) = match summarize_mode(mode) {
            Ok(curve) => (format!("{:.0}", curve.mttf), format!("{:.0}", curve.b10)),
            Err(_) => ("n/a".to_string(), "n/a".to_string()),
        };
        out.push_str(&format!(
            "{:<34} {:>3} {:>3} {:>3} {:>5} {:>6.2} {:>10.0} {:>10} {:>10}\n",
            truncate(&mode.failure_mode, 34),
            mode.severity,
            mode.occurrence,
            mode.detection,
            mode.rpn,
            mode.weibull_beta,
            mode.weibull_eta,
            mttf,
            b10
        ));
    }

    out.push('\n');
    for mode in report.ranked() {
        out.push_str(&format!("{}\n", mode.failure_mode));
        out.push_str(&format!("  cause : {}\n", mode.cause));
        out.push_str(&format!("  effect: {}\n", mode.effect));
        out.push_str(&format!("  action: {}\n", mode.recommendations));
    }
    out
}

pub fn format_asset_types(types: &[&str]) -> String {
    let mut out = String::from("Asset types:\n");
    for t in types {
        out.push_str(&format!("- {t}\n"));
    }
    out
}

/// Catalog listing; the default is marked with `*`.
pub fn format_characteristics(asset_type: &str, catalog: &[Characteristic]) -> String {
    let mut out = format!("Operating characteristics: {asset_type}\n");
    for c in catalog {
        let detail = match c.kind {
            CharacteristicKind::Choice(options) => options
                .iter()
                .enumerate()
                .map(|(i, o)| if i == 0 { format!("{o}*") } else { o.to_string() })
                .collect::<Vec<_>>()
                .join(" | "),
            CharacteristicKind::Range { min, max, default, step } => {
                format!("{min}..={max} (default {default}, step {step})")
            }
        };
        out.push_str(&format!("- {:<28} {}\n", c.name, detail));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{FitInput, FitRequest, run_fit};
    use crate::domain::{CurveType, ExportKind, GridConfig};
    use crate::fmea::{DefaultFailureModes, FailureModeSource, OperatingCharacteristics, operating_characteristics};

    #[test]
    fn fit_summary_lists_parameters_and_calibration() {
        let resp = run_fit(&FitRequest {
            input: FitInput::Points { times: [1.0, 2.0, 3.0] },
            grid: GridConfig::with_points(10),
            curve_type: CurveType::Cdf,
            export_kind: ExportKind::Cdf,
        })
        .unwrap();
        let txt = format_fit_summary(&resp);
        assert!(txt.contains("Point-Based Fit"));
        assert!(txt.contains("Shape (k):"));
        assert!(txt.contains("Calibration check:"));
        assert!(txt.contains("increasing failure rate"));
    }

    #[test]
    fn empty_saved_list_has_hint() {
        assert!(format_saved_list(&[]).contains("No curves saved yet"));
    }

    #[test]
    fn fmea_table_is_ranked() {
        let report = DefaultFailureModes
            .generate("Circuit Breaker", &OperatingCharacteristics::new())
            .unwrap();
        let txt = format_fmea(&report);
        let first_row = txt.lines().find(|l| l.contains("240")).unwrap_or_default();
        assert!(first_row.starts_with("Operating Mechanism Failure"));
    }

    #[test]
    fn characteristics_listing_marks_defaults() {
        let txt = format_characteristics("Circuit Breaker", &operating_characteristics("Circuit Breaker"));
        assert!(txt.contains("SF6* | Vacuum"));
        assert!(txt.contains("1..=800 (default 138, step 1)"));
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
