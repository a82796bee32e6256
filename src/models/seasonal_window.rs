//! Seasonal Window Average backend.
//!
//! Forecasts by averaging observations from the same season across multiple
//! previous cycles. Seasons are located by timestamp, so training data with
//! holes (for example after dropping negative readings) is handled.

use super::traits::{BoxedFittedModel, FittedModel, SeasonalModel};
use crate::error::{DepletionError, Result};
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;

/// Seasonal Window Average model.
///
/// Estimates are the average of observations exactly `k * period` hours
/// earlier, for the most recent `window` such cycles present in history.
#[derive(Debug, Clone)]
pub struct SeasonalWindowAverage {
    period: usize,
    window: usize, // Number of seasonal cycles to average
}

impl SeasonalWindowAverage {
    /// Create a new SeasonalWindowAverage model.
    ///
    /// # Arguments
    /// * `period` - The seasonal period in hours
    /// * `window` - Number of seasonal cycles to average (1 = seasonal naive)
    pub fn new(period: usize, window: usize) -> Self {
        Self {
            period: period.max(1),
            window: window.max(1),
        }
    }

    /// Get the seasonal period in hours.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Get the window size.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for SeasonalWindowAverage {
    fn default() -> Self {
        Self::new(168, 4) // Weekly with a four-week window
    }
}

impl SeasonalModel for SeasonalWindowAverage {
    fn fit(&self, timestamps: &[NaiveDateTime], values: &[f64]) -> Result<BoxedFittedModel> {
        if timestamps.len() != values.len() {
            return Err(DepletionError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if values.is_empty() {
            return Err(DepletionError::InsufficientData { needed: 1, got: 0 });
        }

        let history: BTreeMap<NaiveDateTime, f64> =
            timestamps.iter().copied().zip(values.iter().copied()).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        let mut fitted_model = FittedSeasonalWindow {
            period: Duration::hours(self.period as i64),
            window: self.window,
            history,
            mean,
            fitted: Vec::new(),
            residuals: Vec::new(),
        };

        let fitted: Vec<f64> = timestamps
            .iter()
            .map(|ts| fitted_model.estimate(*ts))
            .collect();
        fitted_model.residuals = values.iter().zip(&fitted).map(|(v, f)| v - f).collect();
        fitted_model.fitted = fitted;

        Ok(Box::new(fitted_model))
    }

    fn name(&self) -> &str {
        "SeasonalWindowAverage"
    }
}

#[derive(Debug, Clone)]
struct FittedSeasonalWindow {
    period: Duration,
    window: usize,
    history: BTreeMap<NaiveDateTime, f64>,
    mean: f64,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedSeasonalWindow {
    fn estimate(&self, target: NaiveDateTime) -> f64 {
        let Some(earliest) = self.history.keys().next().copied() else {
            return self.mean;
        };

        let mut sum = 0.0;
        let mut count = 0;
        let mut ts = target - self.period;
        while ts >= earliest && count < self.window {
            if let Some(v) = self.history.get(&ts) {
                sum += v;
                count += 1;
            }
            ts -= self.period;
        }

        if count > 0 {
            sum / count as f64
        } else {
            // No earlier cycle: fall back to the overall level
            self.mean
        }
    }
}

impl FittedModel for FittedSeasonalWindow {
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>> {
        Ok(timestamps.iter().map(|ts| self.estimate(*ts)).collect())
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}
