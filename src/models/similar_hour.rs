//! Same weekday and hour estimator.
//!
//! Consumption at a station repeats with the week: Monday 08:00 looks like
//! previous Mondays at 08:00. The estimate is the mean of the most recent
//! matching samples.

use crate::core::{weekday_of, HourlySeries};
use crate::transform::trailing_mean;
use chrono::{NaiveDateTime, Timelike};

/// Number of most recent matching samples averaged by default.
pub const DEFAULT_WINDOW: usize = 10;

/// Estimates hourly consumption from history at the same weekday and hour.
#[derive(Debug, Clone, Copy)]
pub struct SimilarHourEstimator {
    window: usize,
}

impl SimilarHourEstimator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Mean of the last `min(window, matches)` samples with the given
    /// weekday (Monday = 0) and hour.
    ///
    /// Without any match this falls back to the mean of the whole history,
    /// which is NaN for an empty history.
    pub fn estimate(&self, weekday: u32, hour: u32, history: &HourlySeries) -> f64 {
        let matching: Vec<f64> = history
            .iter()
            .filter(|s| s.weekday() == weekday && s.hour() == hour)
            .map(|s| s.quantity())
            .collect();

        trailing_mean(&matching, self.window).unwrap_or_else(|| history.mean_quantity())
    }

    /// Estimate for the weekday and hour of `timestamp`.
    pub fn estimate_at(&self, timestamp: NaiveDateTime, history: &HourlySeries) -> f64 {
        self.estimate(weekday_of(&timestamp), timestamp.hour(), history)
    }
}

impl Default for SimilarHourEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
