//! Ordinary least squares on a time index.
//!
//! Used for the λ → ∞ limit of the HP filter: when the second-difference
//! penalty dominates, the trend is the OLS line `a + b·t`, `t = 0..n-1`.
//!
//! The design matrix is tiny (n×2), so we solve it with nalgebra's SVD rather
//! than through the normal equations.

use nalgebra::{DMatrix, DVector};

use crate::error::{CycleError, Result};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Intercept and slope of the OLS fit of `values` on `0..n`.
pub fn linear_fit(values: &[f64]) -> Result<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Err(CycleError::InsufficientData { needed: 2, got: n });
    }

    let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
    let y = DVector::from_column_slice(values);

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| CycleError::numerical("least-squares linear fit failed"))?;
    Ok((beta[0], beta[1]))
}

/// Fitted values of the OLS line on `0..n`.
pub fn linear_trend(values: &[f64]) -> Result<Vec<f64>> {
    let (a, b) = linear_fit(values)?;
    Ok((0..values.len()).map(|i| a + b * i as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn linear_fit_recovers_noisy_line() {
        // 1 + 0.5 t with alternating ±0.1 noise.
        let values = [1.1, 1.4, 2.1, 2.4, 3.1, 3.4];
        let (a, b) = linear_fit(&values).unwrap();
        let expected_b = 0.5 - 0.3 / 17.5;
        let expected_a = 2.25 - expected_b * 2.5;
        assert!((b - expected_b).abs() < 1e-10, "slope {b}");
        assert!((a - expected_a).abs() < 1e-10, "intercept {a}");

        let trend = linear_trend(&values).unwrap();
        let mean_resid: f64 = values.iter().zip(&trend).map(|(y, t)| y - t).sum::<f64>() / 6.0;
        assert!(mean_resid.abs() < 1e-12);
    }

    #[test]
    fn single_point_is_insufficient() {
        assert_eq!(
            linear_fit(&[1.0]).unwrap_err(),
            CycleError::InsufficientData { needed: 2, got: 1 }
        );
    }
}
