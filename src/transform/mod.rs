//! Series transforms applied before decomposition.

use crate::domain::TimeSeries;
use crate::error::{CycleError, Result};

/// Natural log of every observation.
///
/// Missing observations (NaN) stay missing. Any present value that is not a
/// finite positive number fails with [`CycleError::Domain`].
pub fn log_transform(series: &TimeSeries) -> Result<TimeSeries> {
    let mut logged = Vec::with_capacity(series.len());
    for (date, value) in series.iter() {
        if value.is_nan() {
            logged.push(f64::NAN);
            continue;
        }
        if !(value.is_finite() && value > 0.0) {
            return Err(CycleError::domain(format!(
                "log undefined for value {value} at {date}"
            )));
        }
        logged.push(value.ln());
    }
    series.with_values(logged)
}
