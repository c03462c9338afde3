//! Sample moments over finite observations.
//!
//! Every function here returns a typed error instead of NaN when the moment is
//! undefined (too few points, zero variance).

use crate::error::{CycleError, Result};

/// True when the centred sum of squares `ss` of `xs` is within the rounding
/// error of computing the mean, `(4 · n · ε · max|x|)²` per observation.
fn negligible_spread(ss: f64, xs: &[f64]) -> bool {
    let n = xs.len() as f64;
    let scale = xs.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    let tol = 4.0 * n * f64::EPSILON * scale;
    ss <= n * tol * tol
}

pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(CycleError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation (n − 1 denominator).
pub fn sample_std(xs: &[f64]) -> Result<f64> {
    let n = xs.len();
    if n < 2 {
        return Err(CycleError::InsufficientData { needed: 2, got: n });
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Ok((ss / (n as f64 - 1.0)).sqrt())
}

/// Pearson correlation of two equally long samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(CycleError::domain(format!(
            "correlation needs equal lengths ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    let n = xs.len();
    if n < 2 {
        return Err(CycleError::InsufficientData { needed: 2, got: n });
    }

    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if negligible_spread(sxx, xs) || negligible_spread(syy, ys) {
        return Err(CycleError::numerical(
            "correlation undefined for a zero-variance sample",
        ));
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Lag-1 autocorrelation as the Pearson correlation of `x[1..]` on `x[..n-1]`.
pub fn lagged_pearson(xs: &[f64]) -> Result<f64> {
    let n = xs.len();
    if n < 3 {
        return Err(CycleError::InsufficientData { needed: 3, got: n });
    }
    pearson(&xs[1..], &xs[..n - 1])
}

/// Classical lag-1 autocorrelation: `Σ (x_t − m)(x_{t−1} − m) / Σ (x_t − m)²`.
pub fn acf_lag1(xs: &[f64]) -> Result<f64> {
    let n = xs.len();
    if n < 2 {
        return Err(CycleError::InsufficientData { needed: 2, got: n });
    }
    let m = mean(xs)?;
    let denom: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    if negligible_spread(denom, xs) {
        return Err(CycleError::numerical(
            "autocorrelation undefined for a zero-variance sample",
        ));
    }
    let num: f64 = xs.windows(2).map(|w| (w[1] - m) * (w[0] - m)).sum();
    Ok(num / denom)
}
