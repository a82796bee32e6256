//! Run configuration.
//!
//! Every field has a default matching the reference run, so an empty TOML
//! document is a valid configuration. Timestamps are quoted ISO strings such
//! as `"2024-10-21T07:00:00"`.

use crate::error::{DepletionError, Result};
use crate::models::BlendWeights;
use crate::simulation::DEFAULT_MAX_EXTRA_ITERATIONS;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seasonal backend used by the hybrid forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    /// Trend plus Fourier seasonality.
    #[default]
    Additive,
    /// Same hour-of-week mean over recent weeks.
    SeasonalWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tank: u32,
    pub initial_volume: f64,
    pub dead_stock: f64,

    pub forecast_start: NaiveDateTime,
    /// Inclusive; need not sit on an hour boundary.
    pub forecast_end: NaiveDateTime,
    /// Training history is everything strictly before this instant.
    pub history_cutoff: NaiveDateTime,

    /// Inclusive range of actual consumption used for comparison.
    pub actual_start: NaiveDateTime,
    pub actual_end: NaiveDateTime,

    /// Half-open `[accuracy_start, accuracy_end)` range averaged into the
    /// reported accuracy.
    pub accuracy_start: NaiveDateTime,
    pub accuracy_end: NaiveDateTime,

    pub model_weight: f64,
    pub similar_hour_weight: f64,
    pub similar_hour_window: usize,
    pub max_extra_iterations: usize,

    pub backend: ModelBackend,
    /// Weeks averaged by the seasonal window backend.
    pub seasonal_window_weeks: usize,
}

fn reference_time(day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap_or_default()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tank: 3,
            initial_volume: 2804.0,
            dead_stock: 1565.0,
            forecast_start: reference_time(21, 7, 0, 0),
            forecast_end: reference_time(21, 23, 59, 59),
            history_cutoff: reference_time(22, 0, 0, 0),
            actual_start: reference_time(20, 0, 0, 0),
            actual_end: reference_time(22, 0, 0, 0),
            accuracy_start: reference_time(21, 0, 0, 0),
            accuracy_end: reference_time(22, 0, 0, 0),
            model_weight: 0.7,
            similar_hour_weight: 0.3,
            similar_hour_window: 10,
            max_extra_iterations: DEFAULT_MAX_EXTRA_ITERATIONS,
            backend: ModelBackend::Additive,
            seasonal_window_weeks: 4,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DepletionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn weights(&self) -> Result<BlendWeights> {
        BlendWeights::new(self.model_weight, self.similar_hour_weight)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DepletionError::Config(msg));

        self.weights()
            .map_err(|e| DepletionError::Config(e.to_string()))?;
        if !self.initial_volume.is_finite() || !self.dead_stock.is_finite() {
            return invalid("volumes must be finite".into());
        }
        if self.similar_hour_window == 0 {
            return invalid("similar_hour_window must be at least 1".into());
        }
        if self.seasonal_window_weeks == 0 {
            return invalid("seasonal_window_weeks must be at least 1".into());
        }
        if self.forecast_end < self.forecast_start {
            return invalid(format!(
                "forecast_end {} is before forecast_start {}",
                self.forecast_end, self.forecast_start
            ));
        }
        if self.actual_end < self.actual_start {
            return invalid(format!(
                "actual_end {} is before actual_start {}",
                self.actual_end, self.actual_start
            ));
        }
        if self.accuracy_end <= self.accuracy_start {
            return invalid("accuracy window is empty".into());
        }
        Ok(())
    }
}
