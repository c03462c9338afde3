//! Hodrick–Prescott trend/cycle decomposition.
//!
//! The trend `τ` minimizes
//!
//! ```text
//! Σ (y_t − τ_t)² + λ Σ [(τ_{t+1} − τ_t) − (τ_t − τ_{t−1})]²
//! ```
//!
//! which is the linear system `(I + λ KᵀK) τ = y` with `K` the second-difference
//! operator. The matrix is symmetric positive definite and pentadiagonal, so we
//! solve it with a banded Cholesky factorization in O(n).
//!
//! The condition number of `I + λ KᵀK` grows like `16 λ`. Above
//! [`DUAL_SOLVE_LAMBDA`] we solve the equivalent dual system instead:
//!
//! ```text
//! (λ⁻¹ I + K Kᵀ) x = K y,   c = Kᵀ x,   τ = y − c
//! ```
//!
//! which is pentadiagonal too but stays well conditioned as λ grows.
//!
//! Special values:
//! - `λ = 0`: the system is the identity and the trend reproduces the input.
//! - `λ = ∞`: the penalty forces zero second differences; the trend is the OLS
//!   line on a time index.
//! - input whose second differences vanish to rounding is already a line; the
//!   trend is the input and the cycle is exactly zero for every λ.

use tracing::debug;

use crate::domain::{CycleConfig, DecomposedSeries, TimeSeries};
use crate::error::{CycleError, Result};
use crate::math::{Pentadiagonal, linear_trend};

/// Default minimum series length.
pub const DEFAULT_MIN_LEN: usize = 5;

/// Largest λ solved through `I + λ KᵀK`; larger values use the dual system.
pub const DUAL_SOLVE_LAMBDA: f64 = 1e6;

/// Second differences below `LINEAR_TOLERANCE · ε · max|y|` are rounding noise.
const LINEAR_TOLERANCE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpFilter {
    lambda: f64,
    min_len: usize,
}

impl HpFilter {
    /// Filter with smoothing parameter `lambda` (must be ≥ 0; `+∞` allowed).
    pub fn new(lambda: f64) -> Result<Self> {
        if lambda.is_nan() || lambda < 0.0 {
            return Err(CycleError::domain(format!(
                "smoothing parameter must be >= 0, got {lambda}"
            )));
        }
        Ok(Self {
            lambda,
            min_len: DEFAULT_MIN_LEN,
        })
    }

    pub fn from_config(config: &CycleConfig) -> Result<Self> {
        Ok(Self::new(config.lambda)?.with_min_len(config.min_len))
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Trend of a fully observed sample.
    pub fn trend(&self, values: &[f64]) -> Result<Vec<f64>> {
        let needed = self.min_len.max(1);
        if values.len() < needed {
            return Err(CycleError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(CycleError::domain(format!(
                "non-finite value {} at position {i}",
                values[i]
            )));
        }

        if is_linear(values) {
            return Ok(values.to_vec());
        }
        if self.lambda.is_infinite() {
            return linear_trend(values);
        }
        if self.lambda <= DUAL_SOLVE_LAMBDA {
            primal_trend(values, self.lambda)
        } else {
            dual_trend(values, self.lambda)
        }
    }

    /// Split `series` into trend and cycle on the same index.
    ///
    /// Leading and trailing missing observations are trimmed before the solve and
    /// come back as NaN in both components; a gap inside the sample is an error.
    pub fn decompose(&self, series: &TimeSeries) -> Result<DecomposedSeries> {
        let values = series.values();
        let first = values.iter().position(|v| !v.is_nan());
        let last = values.iter().rposition(|v| !v.is_nan());
        let (first, last) = match (first, last) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(CycleError::InsufficientData {
                    needed: self.min_len.max(1),
                    got: 0,
                });
            }
        };

        if let Some(i) = values[first..=last].iter().position(|v| v.is_nan()) {
            return Err(CycleError::domain(format!(
                "missing observation inside the sample at {}",
                series.dates()[first + i]
            )));
        }

        let core = self.trend(&values[first..=last])?;

        let mut trend = vec![f64::NAN; values.len()];
        trend[first..=last].copy_from_slice(&core);
        let cycle: Vec<f64> = values.iter().zip(&trend).map(|(y, t)| y - t).collect();

        debug!(
            n = core.len(),
            trimmed = values.len() - core.len(),
            lambda = self.lambda,
            "hp decomposition"
        );

        Ok(DecomposedSeries {
            lambda: self.lambda,
            observed: series.clone(),
            trend: series.with_values(trend)?,
            cycle: series.with_values(cycle)?,
        })
    }
}

fn second_differences(values: &[f64]) -> Vec<f64> {
    values.windows(3).map(|w| w[0] - 2.0 * w[1] + w[2]).collect()
}

/// True when every second difference is within rounding of zero.
fn is_linear(values: &[f64]) -> bool {
    let scale = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tol = LINEAR_TOLERANCE * f64::EPSILON * scale;
    values
        .windows(3)
        .all(|w| (w[0] - 2.0 * w[1] + w[2]).abs() <= tol)
}

/// `(I + λ KᵀK) τ = y`.
fn primal_trend(values: &[f64], lambda: f64) -> Result<Vec<f64>> {
    Pentadiagonal::hp_system(values.len(), lambda)
        .cholesky()?
        .solve(values)
}

/// `τ = y − Kᵀ (λ⁻¹ I + K Kᵀ)⁻¹ K y`, for `λ > 0`.
fn dual_trend(values: &[f64], lambda: f64) -> Result<Vec<f64>> {
    let d = second_differences(values);
    let x = Pentadiagonal::hp_dual_system(d.len(), lambda)
        .cholesky()?
        .solve(&d)?;

    let m = x.len();
    let trend = values
        .iter()
        .enumerate()
        .map(|(j, y)| {
            // (Kᵀ x)_j = x_{j-2} − 2 x_{j-1} + x_j over the rows that exist
            let mut c = 0.0;
            if j < m {
                c += x[j];
            }
            if j >= 1 && j - 1 < m {
                c -= 2.0 * x[j - 1];
            }
            if j >= 2 && j - 2 < m {
                c += x[j - 2];
            }
            y - c
        })
        .collect();
    Ok(trend)
}

impl Default for HpFilter {
    fn default() -> Self {
        Self {
            lambda: CycleConfig::default().lambda,
            min_len: DEFAULT_MIN_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linear_fit;
    use chrono::{Months, NaiveDate};

    fn quarterly(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start.checked_add_months(Months::new(3 * i as u32)).unwrap())
            .collect();
        TimeSeries::new(dates, values.to_vec()).unwrap()
    }

    /// Deterministic wiggly series: drift plus two sines.
    fn wiggly(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                4.0 + 0.01 * t + 0.03 * (t * 0.7).sin() + 0.01 * (t * 2.3).cos()
            })
            .collect()
    }

    #[test]
    fn zero_lambda_reproduces_the_input() {
        let y = wiggly(30);
        let out = HpFilter::new(0.0).unwrap().decompose(&quarterly(&y)).unwrap();
        for i in 0..y.len() {
            assert!((out.trend.values()[i] - y[i]).abs() < 1e-9);
            assert!(out.cycle.values()[i].abs() < 1e-9);
        }
    }

    #[test]
    fn trend_plus_cycle_is_the_input() {
        let y = wiggly(50);
        for lambda in [0.0, 1.0, 1600.0, 1e5, 1e8, f64::INFINITY] {
            let out = HpFilter::new(lambda).unwrap().decompose(&quarterly(&y)).unwrap();
            assert_eq!(out.trend.dates(), out.observed.dates());
            assert_eq!(out.cycle.dates(), out.observed.dates());
            for i in 0..y.len() {
                let sum = out.trend.values()[i] + out.cycle.values()[i];
                assert!((sum - y[i]).abs() < 1e-9, "lambda {lambda}, i {i}");
            }
        }
    }

    #[test]
    fn large_lambda_converges_to_ols_line() {
        let y = wiggly(20);
        let trend = HpFilter::new(1e8).unwrap().trend(&y).unwrap();
        let (a, b) = linear_fit(&y).unwrap();
        for (i, t) in trend.iter().enumerate() {
            let line = a + b * i as f64;
            assert!((t - line).abs() < 1e-4, "i {i}: {t} vs {line}");
        }
    }

    fn max_ols_deviation(lambda: f64, y: &[f64]) -> f64 {
        let trend = HpFilter::new(lambda).unwrap().trend(y).unwrap();
        let (a, b) = linear_fit(y).unwrap();
        trend
            .iter()
            .enumerate()
            .map(|(i, t)| (t - (a + b * i as f64)).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn very_large_lambda_keeps_approaching_ols_line() {
        let y: Vec<f64> = (0..20)
            .map(|i| {
                let t = i as f64;
                4.0 + 0.01 * t + 0.03 * (t * 0.7).sin()
            })
            .collect();
        let devs: Vec<f64> = [1e8, 1e10, 1e12, 1e14]
            .iter()
            .map(|&lambda| max_ols_deviation(lambda, &y))
            .collect();
        assert!(devs[0] < 1e-6, "{devs:?}");
        for w in devs.windows(2) {
            assert!(w[1] <= w[0] + 1e-9, "{devs:?}");
        }
        assert!(devs[3] < 1e-8, "{devs:?}");
    }

    #[test]
    fn dual_solve_matches_primal_solve() {
        let y = wiggly(60);
        for lambda in [10.0, 1600.0, 1e4] {
            let primal = primal_trend(&y, lambda).unwrap();
            let dual = dual_trend(&y, lambda).unwrap();
            for (p, d) in primal.iter().zip(&dual) {
                assert!((p - d).abs() < 1e-8, "lambda {lambda}: {p} vs {d}");
            }
        }
    }

    #[test]
    fn high_level_linear_input_has_an_exactly_zero_cycle() {
        use crate::domain::PersistenceMethod;
        use crate::stats::{persistence, volatility};

        let y: Vec<f64> = (0..168).map(|i| 9.0 + 0.0065 * i as f64).collect();
        for lambda in [1600.0, 1e10, f64::INFINITY] {
            let out = HpFilter::new(lambda).unwrap().decompose(&quarterly(&y)).unwrap();
            assert!(out.cycle.values().iter().all(|c| *c == 0.0), "lambda {lambda}");
            assert_eq!(volatility(&out.cycle).unwrap(), 0.0);
            assert!(matches!(
                persistence(&out.cycle, PersistenceMethod::LaggedPearson),
                Err(CycleError::Numerical(_))
            ));
        }
    }

    #[test]
    fn infinite_lambda_is_the_ols_line() {
        let y = wiggly(12);
        let trend = HpFilter::new(f64::INFINITY).unwrap().trend(&y).unwrap();
        let second_diffs = trend.windows(3).map(|w| w[2] - 2.0 * w[1] + w[0]);
        for d in second_diffs {
            assert!(d.abs() < 1e-12);
        }
    }

    #[test]
    fn linear_input_has_zero_cycle() {
        let y: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let out = HpFilter::new(1600.0).unwrap().decompose(&quarterly(&y)).unwrap();
        for (i, c) in out.cycle.values().iter().enumerate() {
            assert!(c.abs() < 1e-8, "cycle[{i}] = {c}");
            assert!((out.trend.values()[i] - y[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn four_points_are_insufficient() {
        let err = HpFilter::new(1600.0)
            .unwrap()
            .decompose(&quarterly(&[1.0, 2.0, 3.0, 4.0]))
            .unwrap_err();
        assert_eq!(err, CycleError::InsufficientData { needed: 5, got: 4 });
    }

    #[test]
    fn min_len_is_configurable() {
        let filter = HpFilter::new(1600.0).unwrap().with_min_len(8);
        assert!(filter.trend(&wiggly(7)).is_err());
        assert!(filter.trend(&wiggly(8)).is_ok());
    }

    #[test]
    fn negative_or_nan_lambda_is_rejected() {
        assert!(matches!(HpFilter::new(-1.0), Err(CycleError::Domain(_))));
        assert!(matches!(HpFilter::new(f64::NAN), Err(CycleError::Domain(_))));
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let s = quarterly(&wiggly(64));
        let filter = HpFilter::default();
        let a = filter.decompose(&s).unwrap();
        let b = filter.decompose(&s).unwrap();
        let bits = |xs: &[f64]| xs.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(a.trend.values()), bits(b.trend.values()));
        assert_eq!(bits(a.cycle.values()), bits(b.cycle.values()));
    }

    #[test]
    fn edge_gaps_are_trimmed_and_reported_as_nan() {
        let mut y = vec![f64::NAN, f64::NAN];
        y.extend(wiggly(10));
        y.push(f64::NAN);
        let out = HpFilter::default().decompose(&quarterly(&y)).unwrap();
        assert_eq!(out.trend.len(), 13);
        assert!(out.trend.values()[0].is_nan() && out.cycle.values()[1].is_nan());
        assert!(out.cycle.values()[12].is_nan());
        assert_eq!(out.cycle.observed_len(), 10);

        let direct = HpFilter::default().trend(&wiggly(10)).unwrap();
        assert_eq!(&out.trend.values()[2..12], direct.as_slice());
    }

    #[test]
    fn interior_gap_is_a_domain_error() {
        let mut y = wiggly(10);
        y[4] = f64::NAN;
        let err = HpFilter::default().decompose(&quarterly(&y)).unwrap_err();
        assert!(matches!(err, CycleError::Domain(_)));
    }

    #[test]
    fn long_series_solve_stays_finite() {
        let y = wiggly(20_000);
        let trend = HpFilter::default().trend(&y).unwrap();
        assert_eq!(trend.len(), y.len());
        assert!(trend.iter().all(|v| v.is_finite()));
    }
}
