//! Symmetric pentadiagonal systems.
//!
//! The HP filter normal equations `(I + λ KᵀK) τ = y` and their dual
//! `(λ⁻¹ I + KKᵀ) x = K y` both have bandwidth 2, so we store only the three
//! non-zero diagonals and factor with a banded Cholesky decomposition `A = L Lᵀ`:
//!
//! ```text
//! l0[j] = sqrt(d[j] - l1[j-1]² - l2[j-2]²)
//! l1[j] = (e[j] - l2[j-1]·l1[j-1]) / l0[j]
//! l2[j] = f[j] / l0[j]
//! ```
//!
//! Both the factorization and the two triangular solves are O(n) in time and
//! memory.

use crate::error::{CycleError, Result};

/// Lower band of a symmetric pentadiagonal matrix.
///
/// - `diag[i]  = A[i][i]`      (length n)
/// - `upper1[i] = A[i][i+1]`   (length n-1)
/// - `upper2[i] = A[i][i+2]`   (length n-2)
#[derive(Debug, Clone, PartialEq)]
pub struct Pentadiagonal {
    diag: Vec<f64>,
    upper1: Vec<f64>,
    upper2: Vec<f64>,
}

impl Pentadiagonal {
    /// The n×n identity.
    pub fn identity(n: usize) -> Self {
        Self {
            diag: vec![1.0; n],
            upper1: vec![0.0; n.saturating_sub(1)],
            upper2: vec![0.0; n.saturating_sub(2)],
        }
    }

    /// `I + λ KᵀK` with `K` the (n−2)×n second-difference operator.
    ///
    /// Built by accumulating each row `(1, -2, 1)` of `K`, so the end rows get
    /// fewer terms without any special-casing.
    pub fn hp_system(n: usize, lambda: f64) -> Self {
        const K_ROW: [f64; 3] = [1.0, -2.0, 1.0];

        let mut m = Self::identity(n);
        for r in 0..n.saturating_sub(2) {
            for a in 0..3 {
                for b in a..3 {
                    let v = lambda * K_ROW[a] * K_ROW[b];
                    m.add(r + a, r + b, v);
                }
            }
        }
        m
    }

    /// `λ⁻¹ I + K Kᵀ` for `m` second differences (`m = n - 2`).
    ///
    /// `K Kᵀ` has constant bands `(6, -4, 1)`; the `λ⁻¹` shift keeps the
    /// condition number bounded as λ grows. Requires `λ > 0`.
    pub fn hp_dual_system(m: usize, lambda: f64) -> Self {
        Self {
            diag: vec![6.0 + lambda.recip(); m],
            upper1: vec![-4.0; m.saturating_sub(1)],
            upper2: vec![1.0; m.saturating_sub(2)],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Add `v` at `(i, j)` with `i <= j <= i + 2`.
    fn add(&mut self, i: usize, j: usize, v: f64) {
        match j - i {
            0 => self.diag[i] += v,
            1 => self.upper1[i] += v,
            2 => self.upper2[i] += v,
            _ => unreachable!("outside the pentadiagonal band"),
        }
    }

    /// Banded Cholesky factorization.
    ///
    /// Fails with [`CycleError::Numerical`] if a pivot is not strictly positive
    /// and finite (the matrix is not positive definite).
    pub fn cholesky(&self) -> Result<BandedCholesky> {
        let n = self.len();
        let mut l0 = vec![0.0; n];
        let mut l1 = vec![0.0; n.saturating_sub(1)];
        let mut l2 = vec![0.0; n.saturating_sub(2)];

        for j in 0..n {
            let mut pivot = self.diag[j];
            if j >= 1 {
                pivot -= l1[j - 1] * l1[j - 1];
            }
            if j >= 2 {
                pivot -= l2[j - 2] * l2[j - 2];
            }
            if !(pivot.is_finite() && pivot > 0.0) {
                return Err(CycleError::numerical(format!(
                    "matrix is not positive definite (pivot {pivot:e} at row {j})"
                )));
            }
            let ljj = pivot.sqrt();
            l0[j] = ljj;

            if j + 1 < n {
                let mut v = self.upper1[j];
                if j >= 1 {
                    v -= l2[j - 1] * l1[j - 1];
                }
                l1[j] = v / ljj;
            }
            if j + 2 < n {
                l2[j] = self.upper2[j] / ljj;
            }
        }

        Ok(BandedCholesky { l0, l1, l2 })
    }
}

/// Lower-triangular banded factor `L` with `A = L Lᵀ`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedCholesky {
    l0: Vec<f64>,
    l1: Vec<f64>,
    l2: Vec<f64>,
}

impl BandedCholesky {
    /// Solve `A x = b` by forward then backward substitution.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>> {
        let n = self.l0.len();
        if b.len() != n {
            return Err(CycleError::domain(format!(
                "right-hand side has {} entries, system has {n}",
                b.len()
            )));
        }

        // L z = b
        let mut z = vec![0.0; n];
        for j in 0..n {
            let mut v = b[j];
            if j >= 1 {
                v -= self.l1[j - 1] * z[j - 1];
            }
            if j >= 2 {
                v -= self.l2[j - 2] * z[j - 2];
            }
            z[j] = v / self.l0[j];
        }

        // Lᵀ x = z
        let mut x = vec![0.0; n];
        for j in (0..n).rev() {
            let mut v = z[j];
            if j + 1 < n {
                v -= self.l1[j] * x[j + 1];
            }
            if j + 2 < n {
                v -= self.l2[j] * x[j + 2];
            }
            x[j] = v / self.l0[j];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(CycleError::numerical("banded solve produced non-finite values"));
        }
        Ok(x)
    }
}
