//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - loads FRED CSVs or generates synthetic bundles
//! - runs decomposition + statistics + comparison
//! - prints reports
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Command, CompareArgs, CycleArgs, DecomposeArgs, DemoArgs, cycle_config_from_args};
use crate::data::{SyntheticConfig, generate_bundle};
use crate::domain::{Economy, VariableBundle};
use crate::error::{AppError, EXIT_USAGE};
use crate::filter::HpFilter;

pub mod pipeline;

/// Entry point for the `bcycle` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Compare(args) => handle_compare(args),
        Command::Decompose(args) => handle_decompose(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn init_tracing(verbose: u8) -> Result<(), AppError> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to install logger: {e}")))
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    info!(dir = %args.data_dir.display(), "loading FRED series");
    let bundles: Vec<VariableBundle> = args
        .economies
        .iter()
        .map(|&economy| crate::io::load_bundle(&args.data_dir, economy).window(args.start, args.end))
        .collect();

    compare_and_report(&bundles, &args.cycle)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let synthetic = SyntheticConfig {
        quarters: args.quarters,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    info!(seed = synthetic.seed, quarters = synthetic.quarters, "generating synthetic data");
    let bundles = Economy::ALL
        .into_iter()
        .map(|economy| generate_bundle(economy, &synthetic))
        .collect::<crate::error::Result<Vec<_>>>()?;

    compare_and_report(&bundles, &args.cycle)
}

fn compare_and_report(bundles: &[VariableBundle], args: &CycleArgs) -> Result<(), AppError> {
    let config = cycle_config_from_args(args);
    let run = pipeline::run_comparison(bundles, &config)?;

    print!("{}", crate::report::format_run_summary(&run));
    print!("{}", crate::report::format_comparison_table(&run.table));
    let notes = crate::report::format_unavailable_notes(&run.table);
    if !notes.is_empty() {
        println!("\nNot available:");
        print!("{notes}");
    }

    // Optional exports.
    if let Some(path) = &args.export_json {
        crate::io::write_comparison_json(path, &run.table)?;
    }
    if let Some(dir) = &args.export_dir {
        export_decompositions(dir, &run)?;
    }

    Ok(())
}

fn export_decompositions(dir: &Path, run: &pipeline::ComparisonRun) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to create '{}': {e}", dir.display())))?;
    for economy in &run.economies {
        for (variable, slot) in &economy.cycles {
            if let Some(d) = slot.decomposed() {
                let path = dir.join(format!("{}_{}.csv", economy.economy.short_label().to_lowercase(), variable.key()));
                crate::io::write_decomposition_csv(&path, d)?;
            }
        }
    }
    Ok(())
}

fn handle_decompose(args: DecomposeArgs) -> Result<(), AppError> {
    let ingest = crate::io::read_series_csv(&args.csv)?;
    if !ingest.row_errors.is_empty() {
        eprintln!(
            "Warning: skipped {} malformed rows in '{}'",
            ingest.row_errors.len(),
            args.csv.display()
        );
    }

    let filter = HpFilter::new(args.filter.lambda())?.with_min_len(args.filter.min_len);
    info!(
        series = %ingest.value_column,
        lambda = filter.lambda(),
        min_len = filter.min_len(),
        "decomposing single series"
    );
    let decomposed = pipeline::decompose_series(&ingest.series, &filter, !args.no_log)?;

    print!(
        "{}",
        crate::report::format_decomposition_summary(&ingest.value_column, &decomposed)
    );

    if let Some(path) = &args.export {
        crate::io::write_decomposition_csv(path, &decomposed)?;
    }
    Ok(())
}
