//! Penalized least squares for the additive seasonal model.
//!
//! Solves `(X'X + diag(penalties)) beta = X'y` with a Cholesky
//! decomposition. A per-column penalty is the MAP estimate under independent
//! Gaussian priors, which is how prior scales on trend and seasonality
//! coefficients are expressed.

use crate::error::{DepletionError, Result};

/// Fit penalized least squares over a row-major design matrix.
///
/// # Arguments
/// * `rows` - Design matrix, one row per observation
/// * `y` - Target values (length n)
/// * `penalties` - Diagonal penalty per column (length = number of columns)
///
/// # Returns
/// Coefficients, one per column.
pub fn ridge_fit(rows: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    let n = y.len();
    if n == 0 {
        return Err(DepletionError::InsufficientData { needed: 1, got: 0 });
    }
    if rows.len() != n {
        return Err(DepletionError::DimensionMismatch {
            expected: n,
            got: rows.len(),
        });
    }

    let p = penalties.len();
    if p == 0 {
        return Err(DepletionError::InvalidParameter(
            "design matrix has no columns".into(),
        ));
    }
    if let Some(row) = rows.iter().find(|r| r.len() != p) {
        return Err(DepletionError::DimensionMismatch {
            expected: p,
            got: row.len(),
        });
    }

    // Build X'X (upper triangle, mirrored below) and X'y
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for (row, &y_obs) in rows.iter().zip(y) {
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            xty[i] += xi * y_obs;
            for j in i..p {
                xtx[i][j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
        // Keep the system positive definite even for zero penalties
        xtx[i][i] += penalties[i].max(0.0) + 1e-10;
    }

    solve_symmetric(&xtx, &xty).ok_or_else(|| {
        DepletionError::ComputationError(
            "penalized least squares failed: matrix not positive definite".into(),
        )
    })
}

/// Evaluate a linear predictor `row . beta`.
pub fn predict_row(row: &[f64], beta: &[f64]) -> f64 {
    row.iter().zip(beta).map(|(x, b)| x * b).sum()
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None; // Not positive definite
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
