//! Command-line parsing for the business-cycle comparison tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! engines: everything here ends up as a [`CycleConfig`] passed explicitly.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{CycleConfig, Economy, Frequency, PersistenceMethod, Variable};
use crate::filter::DEFAULT_MIN_LEN;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bcycle", version, about = "HP-filter business cycle statistics")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare economies from local FRED CSV downloads (`<DIR>/<SERIES_ID>.csv`).
    Compare(CompareArgs),
    /// Decompose a single CSV series and print a short summary.
    Decompose(DecomposeArgs),
    /// Run the comparison on seeded synthetic data.
    Demo(DemoArgs),
}

/// Smoothing options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct FilterArgs {
    /// HP smoothing parameter. Defaults to the conventional value for `--frequency`.
    /// `inf` gives the OLS linear trend.
    #[arg(short = 'l', long)]
    pub lambda: Option<f64>,

    /// Sampling frequency used to pick the default lambda.
    #[arg(long, value_enum, default_value_t = Frequency::Quarterly)]
    pub frequency: Frequency,

    /// Minimum number of observations a series needs to be decomposed.
    #[arg(long, default_value_t = DEFAULT_MIN_LEN)]
    pub min_len: usize,
}

impl FilterArgs {
    pub fn lambda(&self) -> f64 {
        self.lambda.unwrap_or_else(|| self.frequency.hp_lambda())
    }
}

/// Statistics options for comparison runs.
#[derive(Debug, Args, Clone)]
pub struct CycleArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Variable the co-movement statistic correlates against.
    #[arg(long, value_enum, default_value_t = Variable::Gdp)]
    pub reference: Variable,

    /// Lag-1 autocorrelation estimator.
    #[arg(long, value_enum, default_value_t = PersistenceMethod::LaggedPearson)]
    pub persistence: PersistenceMethod,

    /// Export the comparison table to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export every decomposition as `<DIR>/<economy>_<variable>.csv`.
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub cycle: CycleArgs,

    /// Directory holding one CSV per FRED series id (e.g. `GDPC1.csv`).
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Economies to compare, in column order.
    #[arg(long = "economy", value_enum, value_delimiter = ',', default_values_t = Economy::ALL.to_vec())]
    pub economies: Vec<Economy>,

    /// First date to keep (inclusive, YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to keep (inclusive, YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Observation CSV (`observation_date,<value>`).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Decompose the raw values instead of their logs.
    #[arg(long)]
    pub no_log: bool,

    /// Write `date,observed,trend,cycle` to this CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    #[command(flatten)]
    pub cycle: CycleArgs,

    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of quarters to generate.
    #[arg(long, default_value_t = 168)]
    pub quarters: usize,
}

pub fn cycle_config_from_args(args: &CycleArgs) -> CycleConfig {
    CycleConfig {
        lambda: args.filter.lambda(),
        reference: args.reference,
        min_len: args.filter.min_len,
        persistence: args.persistence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn compare_defaults_match_quarterly_conventions() {
        let cli = parse(&["bcycle", "compare"]);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let config = cycle_config_from_args(&args.cycle);
        assert_eq!(config, CycleConfig::default());
        assert_eq!(args.economies, Economy::ALL.to_vec());
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn frequency_sets_default_lambda_unless_overridden() {
        let cli = parse(&["bcycle", "demo", "--frequency", "annual"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(cycle_config_from_args(&args.cycle).lambda, 6.25);

        let cli = parse(&["bcycle", "demo", "--frequency", "annual", "-l", "100"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(cycle_config_from_args(&args.cycle).lambda, 100.0);
    }

    #[test]
    fn compare_accepts_economy_list_and_dates() {
        let cli = parse(&[
            "bcycle",
            "-vv",
            "compare",
            "--economy",
            "jp,us",
            "--start",
            "1980-01-01",
            "--persistence",
            "acf",
            "--reference",
            "consumption",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.economies, vec![Economy::Japan, Economy::UnitedStates]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(1980, 1, 1));
        let config = cycle_config_from_args(&args.cycle);
        assert_eq!(config.persistence, PersistenceMethod::Acf);
        assert_eq!(config.reference, Variable::Consumption);
    }

    #[test]
    fn decompose_requires_a_csv() {
        assert!(Cli::try_parse_from(["bcycle", "decompose"]).is_err());
        let cli = parse(&["bcycle", "decompose", "--csv", "gdp.csv", "--no-log", "--lambda", "inf"]);
        let Command::Decompose(args) = cli.command else {
            panic!("expected decompose");
        };
        assert!(args.no_log);
        assert!(args.filter.lambda().is_infinite());
    }
}
