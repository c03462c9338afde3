//! Error types.
//!
//! - [`CycleError`] is what the engines (transform, filter, statistics) return.
//! - [`AppError`] is the binary-facing error: a message plus a process exit code.

use thiserror::Error;

/// Result alias used by the engines.
pub type Result<T> = std::result::Result<T, CycleError>;

/// Typed failures of the decomposition and statistics engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    /// An input value is outside the domain of the operation
    /// (non-positive value before a log, negative λ, duplicate timestamps, ...).
    #[error("domain error: {0}")]
    Domain(String),

    /// Too few observations for the operator or the requested statistic.
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Solver breakdown or an undefined statistic (e.g. zero variance).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// The reference variable has no cycle, so co-movement cannot be computed.
    #[error("reference variable {reference} unavailable ({reason})")]
    MissingReference { reference: String, reason: String },
}

impl CycleError {
    pub fn domain(message: impl Into<String>) -> Self {
        CycleError::Domain(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        CycleError::Numerical(message.into())
    }
}

/// Exit code for usage and I/O problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for engine failures surfaced to the command line.
pub const EXIT_ENGINE: u8 = 3;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CycleError> for AppError {
    fn from(err: CycleError) -> Self {
        AppError::new(EXIT_ENGINE, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_errors_render_descriptive_messages() {
        let err = CycleError::InsufficientData { needed: 5, got: 4 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 5 observations, got 4"
        );
        assert_eq!(
            CycleError::domain("log of -1").to_string(),
            "domain error: log of -1"
        );
        let err = CycleError::MissingReference {
            reference: "gdp".to_string(),
            reason: "missing: not provided".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "reference variable gdp unavailable (missing: not provided)"
        );
    }

    #[test]
    fn engine_errors_map_to_engine_exit_code() {
        let app: AppError = CycleError::numerical("pivot 0").into();
        assert_eq!(app.exit_code(), EXIT_ENGINE);
        assert_eq!(app.to_string(), "numerical error: pivot 0");
    }
}
