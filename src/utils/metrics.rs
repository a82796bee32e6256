//! Accuracy metrics for forecast evaluation.

use crate::core::{ForecastValue, HourlySeries};
use crate::error::{DepletionError, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Ratio accuracy in percent: `100 * min / max`.
///
/// Symmetric in its arguments. Undefined when either value is missing or the
/// larger value is zero, so `(0, 0)` has no accuracy.
pub fn ratio_accuracy(actual: Option<f64>, forecast: Option<f64>) -> Option<f64> {
    let (a, f) = (actual?, forecast?);
    let max = a.max(f);
    if max == 0.0 || !max.is_finite() {
        return None;
    }
    Some(100.0 * (a.min(f) / max))
}

/// One forecast hour joined with its actual value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyRecord {
    pub timestamp: NaiveDateTime,
    pub forecast: f64,
    pub actual: Option<f64>,
    pub accuracy: Option<f64>,
}

/// Result of comparing a forecast against actual consumption.
#[derive(Debug, Clone)]
pub struct AccuracyReport {
    /// One record per forecast point, in forecast order.
    pub records: Vec<AccuracyRecord>,
    /// Mean accuracy over the evaluation window; `None` when no record in the
    /// window has a defined accuracy.
    pub window_average: Option<f64>,
    /// Number of records averaged into `window_average`.
    pub contributing: usize,
    /// Mean Absolute Error over window records with an actual value.
    pub mae: Option<f64>,
    /// Root Mean Squared Error over the same records.
    pub rmse: Option<f64>,
}

/// Scores forecast points against actuals inside `[window_start, window_end)`.
#[derive(Debug, Clone, Copy)]
pub struct AccuracyEvaluator {
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
}

impl AccuracyEvaluator {
    pub fn new(window_start: NaiveDateTime, window_end: NaiveDateTime) -> Result<Self> {
        if window_end <= window_start {
            return Err(DepletionError::InvalidParameter(format!(
                "accuracy window [{}, {}) is empty",
                window_start, window_end
            )));
        }
        Ok(Self {
            window_start,
            window_end,
        })
    }

    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.window_start, self.window_end)
    }

    fn in_window(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.window_start && timestamp < self.window_end
    }

    /// Left-join `points` with `actual` on timestamp and score each hour.
    pub fn evaluate<P: ForecastValue>(&self, points: &[P], actual: &HourlySeries) -> AccuracyReport {
        let records: Vec<AccuracyRecord> = points
            .iter()
            .map(|p| {
                let timestamp = p.timestamp();
                let forecast = p.forecast_value();
                let actual = actual.get(timestamp).map(|s| s.quantity());
                AccuracyRecord {
                    timestamp,
                    forecast,
                    actual,
                    accuracy: ratio_accuracy(actual, Some(forecast)),
                }
            })
            .collect();

        let windowed: Vec<&AccuracyRecord> = records
            .iter()
            .filter(|r| self.in_window(r.timestamp))
            .collect();

        let defined: Vec<f64> = windowed.iter().filter_map(|r| r.accuracy).collect();
        let window_average = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        let errors: Vec<f64> = windowed
            .iter()
            .filter_map(|r| r.actual.map(|a| a - r.forecast))
            .collect();
        let (mae, rmse) = if errors.is_empty() {
            (None, None)
        } else {
            let n = errors.len() as f64;
            let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
            let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
            (Some(mae), Some(mse.sqrt()))
        };

        AccuracyReport {
            records,
            window_average,
            contributing: defined.len(),
            mae,
            rmse,
        }
    }
}
