//! CSV ingest of FRED-style observation files.
//!
//! The expected layout is what FRED's "Download CSV" produces:
//!
//! ```text
//! observation_date,GDPC1
//! 1980-01-01,7341.557
//! 1980-04-01,7190.289
//! ```
//!
//! Design goals:
//! - **Lenient header names**: the date column may be `observation_date`,
//!   `date` or `DATE`; the value column is the first other column
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Explicit gaps**: FRED's `.` placeholder becomes a missing (NaN) value,
//!   so the filter can tell edge gaps from interior ones
//! - **Absence is data**: an unreadable file yields a `Missing` slot, not an abort

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Economy, TimeSeries, Variable, VariableBundle};
use crate::error::{AppError, EXIT_USAGE};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the series plus what happened to each row.
#[derive(Debug, Clone)]
pub struct SeriesIngest {
    pub series: TimeSeries,
    /// Header of the value column (usually the FRED series id).
    pub value_column: String,
    pub rows_read: usize,
    pub missing_values: usize,
    pub row_errors: Vec<RowError>,
}

/// Load one observation CSV into a [`TimeSeries`].
pub fn read_series_csv(path: &Path) -> Result<SeriesIngest, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let (date_idx, value_idx) = resolve_columns(&headers)?;
    let value_column = normalize_header_name(&headers[value_idx]);

    let mut pairs = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut missing_values = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, value_idx) {
            Ok((date, value)) => {
                if value.is_nan() {
                    missing_values += 1;
                }
                pairs.push((date, value));
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if pairs.is_empty() {
        return Err(AppError::new(
            EXIT_USAGE,
            format!("No valid observations in '{}'.", path.display()),
        ));
    }

    let series = TimeSeries::from_pairs(pairs)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Invalid series in '{}': {e}", path.display())))?;

    debug!(
        path = %path.display(),
        rows_read,
        missing_values,
        row_errors = row_errors.len(),
        "series loaded"
    );

    Ok(SeriesIngest {
        series,
        value_column,
        rows_read,
        missing_values,
        row_errors,
    })
}

/// Where the CSV for `(economy, variable)` lives inside `dir`.
pub fn series_path(dir: &Path, economy: Economy, variable: Variable) -> PathBuf {
    dir.join(format!("{}.csv", economy.series_id(variable)))
}

/// Load every variable of `economy` from `dir/<SERIES_ID>.csv`.
///
/// Files that are absent or unreadable become missing slots.
pub fn load_bundle(dir: &Path, economy: Economy) -> VariableBundle {
    let mut bundle = VariableBundle::new(economy);
    for variable in Variable::ALL {
        let path = series_path(dir, economy, variable);
        match read_series_csv(&path) {
            Ok(ingest) => {
                for err in &ingest.row_errors {
                    warn!(path = %path.display(), line = err.line, "{}", err.message);
                }
                bundle = bundle.with_series(variable, ingest.series);
            }
            Err(err) => {
                warn!(
                    economy = economy.short_label(),
                    variable = variable.key(),
                    "skipping variable: {err}"
                );
                bundle = bundle.with_missing(variable, err.to_string());
            }
        }
    }
    bundle
}

fn resolve_columns(headers: &StringRecord) -> Result<(usize, usize), AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let date_idx = names
        .iter()
        .position(|n| matches!(n.as_str(), "observation_date" | "date"))
        .ok_or_else(|| {
            AppError::new(
                EXIT_USAGE,
                "Missing date column (expected `observation_date` or `date`).",
            )
        })?;
    let value_idx = names
        .iter()
        .position(|n| n == "value")
        .or_else(|| (0..names.len()).find(|&i| i != date_idx))
        .ok_or_else(|| AppError::new(EXIT_USAGE, "Missing value column."))?;
    Ok((date_idx, value_idx))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    if name.eq_ignore_ascii_case("date") || name.eq_ignore_ascii_case("value") {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    }
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize) -> Result<(NaiveDate, f64), String> {
    let raw_date = record
        .get(date_idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing date".to_string())?;
    let date = parse_date(raw_date)?;
    let value = parse_value(record.get(value_idx).unwrap_or(""))?;
    Ok((date, value))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

/// `.` and empty cells are FRED's missing-value markers and map to NaN.
fn parse_value(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    let v = trimmed
        .parse::<f64>()
        .map_err(|_| format!("Invalid value '{trimmed}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{trimmed}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::SeriesSlot;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bcycle-ingest-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, body: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn parses_fred_download_layout() {
        let dir = temp_dir("layout");
        let path = dir.join("GDPC1.csv");
        write_file(
            &path,
            "\u{feff}observation_date,GDPC1\n1980-01-01,7341.5\n1980-04-01,.\n1980-07-01,7200.1\nbad-date,1\n",
        );

        let ingest = read_series_csv(&path).unwrap();
        assert_eq!(ingest.value_column, "GDPC1");
        assert_eq!(ingest.rows_read, 4);
        assert_eq!(ingest.series.len(), 3);
        assert_eq!(ingest.missing_values, 1);
        assert!(ingest.series.values()[1].is_nan());
        assert_eq!(ingest.row_errors.len(), 1);
        assert_eq!(ingest.row_errors[0].line, 5);
    }

    #[test]
    fn accepts_date_value_headers_in_any_order() {
        let dir = temp_dir("order");
        let path = dir.join("x.csv");
        write_file(&path, "VALUE,DATE\n2.0,1990-04-01\n1.0,1990-01-01\n");
        let ingest = read_series_csv(&path).unwrap();
        assert_eq!(ingest.series.values(), &[1.0, 2.0]);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let dir = temp_dir("dups");
        let path = dir.join("d.csv");
        write_file(&path, "date,value\n1990-01-01,1\n1990-01-01,2\n");
        assert!(read_series_csv(&path).is_err());
    }

    #[test]
    fn absent_files_become_missing_slots() {
        let dir = temp_dir("bundle");
        write_file(
            &series_path(&dir, Economy::Japan, Variable::Gdp),
            "observation_date,JPNRGDPEXP\n1994-01-01,100\n1994-04-01,101\n",
        );

        let bundle = load_bundle(&dir, Economy::Japan);
        assert!(matches!(bundle.slot(Variable::Gdp), SeriesSlot::Available(_)));
        assert!(matches!(bundle.slot(Variable::Consumption), SeriesSlot::Missing { .. }));
        assert!(matches!(bundle.slot(Variable::Investment), SeriesSlot::Missing { .. }));
    }
}
