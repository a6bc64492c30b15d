//! Command-line parsing for the `wb` Weibull fitting tool.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! command dispatch (`app`) and from the fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{
    CurveType, DEFAULT_MAX_TIME_MULTIPLIER, DEFAULT_MIN_TIME, DEFAULT_NUM_POINTS, ExportKind, GridConfig,
    OutputConfig,
};
use crate::fit::FailurePattern;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wb", version, about = "Weibull failure-curve fitting for asset reliability")]
pub struct Cli {
    /// Saved-curve store (JSON).
    #[arg(long, global = true, env = "WB_STORE", default_value = "weibull_curves.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Use a known shape/scale pair.
    Direct(DirectArgs),
    /// Pick parameters from a short failure-pattern questionnaire.
    Guided(GuidedArgs),
    /// Fit from the ages at which 25%, 50% and 75% of assets have failed.
    Points(PointsArgs),
    /// Maximum-likelihood fit of historical asset lifetimes.
    Mle(MleArgs),
    /// List, show or delete saved curves.
    Saved(SavedArgs),
    /// Compare saved curves side by side.
    Compare(CompareArgs),
    /// Generate an FMEA table with Weibull parameters per failure mode.
    Fmea(FmeaArgs),
    /// List asset types, or one asset type's operating characteristics.
    Assets(AssetsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_bool(self) -> bool {
        self == Answer::Yes
    }
}

#[derive(Debug, Args, Clone)]
pub struct DirectArgs {
    /// Shape parameter (k, β), > 0.
    #[arg(long)]
    pub shape: f64,

    /// Scale parameter (λ, η), > 0.
    #[arg(long)]
    pub scale: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct GuidedArgs {
    /// Dominant failure pattern.
    #[arg(long, value_enum)]
    pub pattern: FailurePattern,

    /// Answer to the pattern's follow-up question.
    #[arg(long, value_enum)]
    pub answer: Answer,

    /// Average expected life of this asset type (becomes the scale).
    #[arg(long, default_value_t = 1.0)]
    pub life: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PointsArgs {
    /// Age at which 25% of assets have failed.
    #[arg(long)]
    pub x1: f64,

    /// Age at which 50% of assets have failed.
    #[arg(long)]
    pub x2: f64,

    /// Age at which 75% of assets have failed.
    #[arg(long)]
    pub x3: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct MleArgs {
    /// Asset CSV (asset_identifier, in_service_date, retirement_date).
    #[arg(long, value_name = "CSV", conflicts_with_all = ["simulate_shape", "simulate_scale"])]
    pub csv: Option<PathBuf>,

    /// Fit a synthetic sample drawn from this shape instead of a CSV.
    #[arg(long, requires = "simulate_scale")]
    pub simulate_shape: Option<f64>,

    /// Scale of the synthetic sample.
    #[arg(long, requires = "simulate_shape")]
    pub simulate_scale: Option<f64>,

    /// Synthetic sample size.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub sample_count: usize,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Optimizer iteration budget.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by every fitting command.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Curve to display.
    #[arg(long, value_enum, default_value_t = CurveType::Cdf)]
    pub curve: CurveType,

    /// Number of sampled points per curve.
    #[arg(long, default_value_t = DEFAULT_NUM_POINTS)]
    pub points: usize,

    /// Grid upper end as a multiple of the scale.
    #[arg(long, default_value_t = DEFAULT_MAX_TIME_MULTIPLIER)]
    pub grid_multiplier: f64,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the sampled curves to CSV (plus a `_parameters.csv` sidecar).
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Columns to export.
    #[arg(long, value_enum, default_value_t = ExportKind::Both)]
    pub export_kind: ExportKind,

    /// Save the fitted curve under this name.
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Description stored with `--save`.
    #[arg(long)]
    pub description: Option<String>,
}

impl OutputArgs {
    pub fn grid(&self) -> GridConfig {
        GridConfig {
            num_points: self.points,
            max_time_multiplier: self.grid_multiplier,
            min_time: DEFAULT_MIN_TIME,
        }
    }

    pub fn to_config(&self, store_path: PathBuf) -> OutputConfig {
        OutputConfig {
            grid: self.grid(),
            curve_type: self.curve,
            plot: self.plot && !self.no_plot,
            plot_width: self.width,
            plot_height: self.height,
            export_path: self.export.clone(),
            export_kind: self.export_kind,
            save_name: self.save.clone(),
            description: self.description.clone(),
            store_path,
        }
    }
}

#[derive(Debug, Args)]
pub struct SavedArgs {
    #[command(subcommand)]
    pub action: SavedAction,
}

#[derive(Debug, Subcommand)]
pub enum SavedAction {
    /// List saved curves.
    List,
    /// Show one saved curve with its plot.
    Show {
        name: String,
        #[arg(long, value_enum, default_value_t = CurveType::Cdf)]
        curve: CurveType,
        #[arg(long, default_value_t = 100)]
        width: usize,
        #[arg(long, default_value_t = 25)]
        height: usize,
    },
    /// Delete a saved curve.
    Delete { name: String },
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Saved curve names.
    #[arg(required = true)]
    pub names: Vec<String>,

    #[arg(long, value_enum, default_value_t = CurveType::Cdf)]
    pub curve: CurveType,

    #[arg(long, default_value_t = DEFAULT_NUM_POINTS)]
    pub points: usize,

    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct FmeaArgs {
    /// Asset type, e.g. "Power Transformer".
    #[arg(long)]
    pub asset_type: String,

    /// Operating characteristic as `key=value` (repeatable). See `wb assets --asset-type TYPE`.
    #[arg(long = "characteristic", short = 'c', value_name = "KEY=VALUE")]
    pub characteristics: Vec<String>,

    /// Skip the LLM and use the built-in tables.
    #[arg(long)]
    pub offline: bool,

    /// Chat model.
    #[arg(long, env = "OPENAI_MODEL", default_value = crate::fmea::DEFAULT_MODEL)]
    pub model: String,

    /// Save a failure mode's curve as `<asset type> - <failure mode>`, by position in the table.
    #[arg(long, value_name = "INDEX")]
    pub save_mode: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AssetsArgs {
    /// Show the characteristics of this asset type.
    #[arg(long)]
    pub asset_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_with_output_flags() {
        let cli = Cli::try_parse_from([
            "wb", "points", "--x1", "1", "--x2", "2", "--x3", "3", "--no-plot", "--export-kind", "all",
            "--grid-multiplier", "4",
        ])
        .unwrap();
        let Command::Points(args) = cli.command else {
            panic!("expected points");
        };
        assert_eq!(args.x2, 2.0);
        let cfg = args.output.to_config(PathBuf::from("s.json"));
        assert!(!cfg.plot);
        assert_eq!(cfg.export_kind, ExportKind::All);
        assert_eq!(cfg.grid.max_time_multiplier, 4.0);
        assert_eq!(cfg.grid.num_points, 1000);
    }

    #[test]
    fn guided_pattern_is_kebab_case() {
        let cli = Cli::try_parse_from(["wb", "guided", "--pattern", "wear-out", "--answer", "yes", "--life", "40"])
            .unwrap();
        let Command::Guided(args) = cli.command else {
            panic!("expected guided");
        };
        assert_eq!(args.pattern, FailurePattern::WearOut);
        assert!(args.answer.as_bool());
    }

    #[test]
    fn csv_and_simulation_conflict() {
        let res = Cli::try_parse_from([
            "wb", "mle", "--csv", "a.csv", "--simulate-shape", "2", "--simulate-scale", "10",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn assets_type_is_optional() {
        let cli = Cli::try_parse_from(["wb", "assets"]).unwrap();
        assert!(matches!(cli.command, Command::Assets(AssetsArgs { asset_type: None })));
    }
}
