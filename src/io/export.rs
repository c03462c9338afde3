//! Export results to CSV/JSON.
//!
//! Exports are meant to be easy to consume in spreadsheets, plotting scripts or
//! downstream reports. Values are written at full precision.

use std::fs::File;
use std::path::Path;

use crate::domain::{ComparisonTable, DecomposedSeries};
use crate::error::{AppError, EXIT_USAGE};

/// Write `date,observed,trend,cycle` rows. Missing values are left empty.
pub fn write_decomposition_csv(path: &Path, decomposed: &DecomposedSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writer
        .write_record(["date", "observed", "trend", "cycle"])
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write export CSV header: {e}")))?;

    let rows = decomposed
        .observed
        .iter()
        .zip(decomposed.trend.values())
        .zip(decomposed.cycle.values());
    for (((date, observed), trend), cycle) in rows {
        writer
            .write_record([
                date.to_string(),
                fmt_value(observed),
                fmt_value(*trend),
                fmt_value(*cycle),
            ])
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the comparison table as pretty JSON.
pub fn write_comparison_json(path: &Path, table: &ComparisonTable) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to create table JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, table)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write table JSON: {e}")))?;
    Ok(())
}

/// Read a table written by [`write_comparison_json`].
pub fn read_comparison_json(path: &Path) -> Result<ComparisonTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to open table JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Invalid table JSON: {e}")))
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() { v.to_string() } else { String::new() }
}
