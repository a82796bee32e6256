//! Trailing and expanding window functions.

/// Mean of the last `window` values, or of all of them when fewer exist.
///
/// Returns `None` for an empty series or a zero window.
pub fn trailing_mean(series: &[f64], window: usize) -> Option<f64> {
    if series.is_empty() || window == 0 {
        return None;
    }
    let start = series.len().saturating_sub(window);
    let tail = &series[start..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

/// Compute expanding sum (cumulative sum).
pub fn expanding_sum(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(series.len());
    let mut sum = 0.0;

    for &x in series {
        sum += x;
        result.push(sum);
    }

    result
}
