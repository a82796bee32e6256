//! Per-hour forecast and depletion points.

use chrono::{Duration, NaiveDateTime};

/// Anything that carries a forecast value at an hourly timestamp.
///
/// Accuracy evaluation works over either hybrid forecast points or the
/// depletion sequence that extends them.
pub trait ForecastValue {
    fn timestamp(&self) -> NaiveDateTime;
    fn forecast_value(&self) -> f64;
}

/// One hour of the hybrid forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    /// Seasonal model estimate, clipped at zero.
    pub model_estimate: f64,
    /// Similar-hour moving average estimate.
    pub similar_hour_estimate: f64,
    /// Weighted blend of the two, never negative.
    pub combined_estimate: f64,
}

impl ForecastValue for ForecastPoint {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn forecast_value(&self) -> f64 {
        self.combined_estimate
    }
}

/// Where a depletion point's consumption estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOrigin {
    /// Taken from the hybrid forecast window.
    Forecast,
    /// Appended past the window from the similar-hour estimator.
    Extension,
}

/// One simulated hour of tank level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionPoint {
    /// Start of the simulated hour.
    pub timestamp: NaiveDateTime,
    pub consumption_estimate: f64,
    /// Level after this hour's consumption has been drawn.
    pub remaining_level: f64,
    pub origin: PointOrigin,
    /// Hours of consumption drawn from the initial volume up to and
    /// including this one.
    pub hours_consumed: usize,
}

impl DepletionPoint {
    /// Instant at which `remaining_level` is reached.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.timestamp + Duration::hours(1)
    }
}

impl ForecastValue for DepletionPoint {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn forecast_value(&self) -> f64 {
        self.consumption_estimate
    }
}
