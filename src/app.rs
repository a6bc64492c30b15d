//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - turns them into a fit request
//! - prints reports/plots
//! - writes optional exports and saved curves

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{AssetsArgs, Cli, Command, CompareArgs, FmeaArgs, MleArgs, SavedAction};
use crate::data::generate_sample;
use crate::domain::{CurveType, FitMethod, GridConfig, OutputConfig, WeibullParameters};
use crate::error::AppError;
use crate::fit::MleOptions;
use crate::fmea::{
    ASSET_TYPES, DefaultFailureModes, FailureModeSource, OpenAiFmeaClient, canonical_asset_type, generate_with_fallback,
    operating_characteristics, parse_characteristics, resolve_characteristics,
};
use crate::io::{CurveStore, load_asset_lifetimes, write_export_csv};
use crate::models::{evaluate_curve, reliability_metrics};
use crate::plot::{PlotSeries, render_ascii_plot};
use crate::report;

use self::pipeline::{FitInput, FitRequest, FitResponse, compare_curves, run_fit};

pub mod pipeline;

/// Entry point for the `wb` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before clap reads `env = ...` defaults.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let store = CurveStore::new(cli.store.clone());

    match cli.command {
        Command::Direct(args) => {
            let input = FitInput::Direct {
                shape: args.shape,
                scale: args.scale,
            };
            handle_fit(input, &args.output.to_config(cli.store))
        }
        Command::Guided(args) => {
            println!("{}", args.pattern.follow_up_question());
            println!("-> {}\n", if args.answer.as_bool() { "yes" } else { "no" });
            let input = FitInput::Guided {
                pattern: args.pattern,
                answer: args.answer.as_bool(),
                expected_life: args.life,
            };
            handle_fit(input, &args.output.to_config(cli.store))
        }
        Command::Points(args) => {
            let input = FitInput::Points {
                times: [args.x1, args.x2, args.x3],
            };
            handle_fit(input, &args.output.to_config(cli.store))
        }
        Command::Mle(args) => handle_mle(args, cli.store),
        Command::Saved(args) => handle_saved(&store, args.action),
        Command::Compare(args) => handle_compare(&store, args),
        Command::Fmea(args) => handle_fmea(&store, args),
        Command::Assets(args) => handle_assets(args),
    }
}

/// Logs go to stderr so report output on stdout stays clean. `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(input: FitInput, config: &OutputConfig) -> Result<(), AppError> {
    let request = FitRequest {
        input,
        grid: config.grid,
        curve_type: config.curve_type,
        export_kind: config.export_kind,
    };
    let resp = run_fit(&request)?;

    println!("{}", report::format_fit_summary(&resp));

    if config.plot {
        println!("{}", plot_response(&resp, config));
    }

    write_outputs(&resp, config)
}

fn plot_response(resp: &FitResponse, config: &OutputConfig) -> String {
    let label = format!(
        "k={:.3}, λ={:.3}",
        resp.parameters.shape, resp.parameters.scale
    );
    // Calibration points live on the CDF scale only.
    let markers: Vec<(f64, f64)> = if resp.curve.curve_type == CurveType::Cdf {
        resp.calibration
            .iter()
            .map(|c| (c.point.time, c.point.cumulative_probability))
            .collect()
    } else {
        Vec::new()
    };
    render_ascii_plot(
        &[PlotSeries {
            label: &label,
            series: &resp.curve,
        }],
        &markers,
        config.plot_width,
        config.plot_height,
    )
}

fn write_outputs(resp: &FitResponse, config: &OutputConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_path {
        let sidecar = write_export_csv(path, &resp.export)?;
        println!(
            "Exported {} rows to {} (parameters in {}).",
            resp.export.rows.len(),
            path.display(),
            sidecar.display()
        );
    }

    if let Some(name) = &config.save_name {
        let store = CurveStore::new(config.store_path.clone());
        let description = config.description.as_deref().unwrap_or_default();
        let saved = store.save(name, description, resp.method, resp.parameters)?;
        println!("Saved curve '{}' to {}.", saved.name, store.path().display());
    }

    Ok(())
}

fn handle_mle(args: MleArgs, store_path: std::path::PathBuf) -> Result<(), AppError> {
    let sample = match (&args.csv, args.simulate_shape, args.simulate_scale) {
        (Some(path), _, _) => {
            let ingested = load_asset_lifetimes(path)?;
            println!("{}", report::format_ingest_report(&ingested));
            ingested.sample()
        }
        (None, Some(shape), Some(scale)) => {
            let params = WeibullParameters::new(shape, scale)?;
            info!(shape, scale, n = args.sample_count, seed = args.seed, "simulating lifetimes");
            generate_sample(params, args.sample_count, args.seed)?
        }
        _ => {
            return Err(AppError::new(
                2,
                "Provide --csv FILE or both --simulate-shape and --simulate-scale.",
            ));
        }
    };

    let options = MleOptions {
        max_iterations: args.max_iterations,
        ..MleOptions::default()
    };
    handle_fit(FitInput::Sample { sample, options }, &args.output.to_config(store_path))
}

fn handle_saved(store: &CurveStore, action: SavedAction) -> Result<(), AppError> {
    match action {
        SavedAction::List => {
            print!("{}", report::format_saved_list(&store.list()?));
        }
        SavedAction::Show {
            name,
            curve,
            width,
            height,
        } => {
            let saved = store.get(&name)?;
            let params = saved.parameters()?;
            let metrics = reliability_metrics(params);
            print!("{}", report::format_saved_curve(&saved));
            println!("MTTF: {:.3} | B10: {:.3}\n", metrics.mttf, metrics.b10);

            let series = evaluate_curve(params, curve, &GridConfig::default())?;
            println!(
                "{}",
                render_ascii_plot(&[PlotSeries { label: &saved.name, series: &series }], &[], width, height)
            );
        }
        SavedAction::Delete { name } => {
            let removed = store.delete(&name)?;
            println!("Deleted curve '{}'.", removed.name);
        }
    }
    Ok(())
}

fn handle_compare(store: &CurveStore, args: CompareArgs) -> Result<(), AppError> {
    let saved = args
        .names
        .iter()
        .map(|name| store.get(name))
        .collect::<Result<Vec<_>, _>>()?;

    let compared = compare_curves(&saved, args.curve, &GridConfig::with_points(args.points))?;
    println!("{}", report::format_comparison(&compared));

    let series: Vec<PlotSeries<'_>> = compared
        .iter()
        .map(|c| PlotSeries {
            label: &c.saved.name,
            series: &c.series,
        })
        .collect();
    println!("{}", render_ascii_plot(&series, &[], args.width, args.height));
    Ok(())
}

fn handle_fmea(store: &CurveStore, args: FmeaArgs) -> Result<(), AppError> {
    let asset_type = canonical_asset_type(&args.asset_type)
        .map(str::to_string)
        .unwrap_or_else(|| args.asset_type.trim().to_string());
    let characteristics = resolve_characteristics(&asset_type, &parse_characteristics(&args.characteristics)?)?;
    let fallback = DefaultFailureModes;

    let report = if args.offline {
        fallback.generate(&asset_type, &characteristics)?
    } else {
        match OpenAiFmeaClient::from_env().map(|c| c.with_model(args.model.as_str())) {
            Ok(client) => generate_with_fallback(&client, &fallback, &asset_type, &characteristics)?,
            Err(err) => {
                warn!(error = %err, "LLM unavailable, using built-in failure modes");
                fallback.generate(&asset_type, &characteristics)?
            }
        }
    };

    print!("{}", report::format_fmea(&report));

    if let Some(index) = args.save_mode {
        let ranked = report.ranked();
        let mode = index
            .checked_sub(1)
            .and_then(|i| ranked.get(i))
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("--save-mode must be between 1 and {}.", ranked.len()),
                )
            })?;
        let name = format!("{} - {}", report.asset_type, mode.failure_mode);
        let saved = store.save(&name, &mode.cause, FitMethod::Fmea, mode.parameters()?)?;
        println!("\nSaved curve '{}' to {}.", saved.name, store.path().display());
    }

    Ok(())
}

fn handle_assets(args: AssetsArgs) -> Result<(), AppError> {
    match args.asset_type.as_deref() {
        None => print!("{}", report::format_asset_types(&ASSET_TYPES)),
        Some(asset_type) => {
            let name = canonical_asset_type(asset_type).unwrap_or(asset_type);
            print!("{}", report::format_characteristics(name, &operating_characteristics(name)));
        }
    }
    Ok(())
}
