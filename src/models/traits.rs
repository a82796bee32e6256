//! Capability traits for seasonal forecasting backends.
//!
//! The hybrid forecaster only needs "fit on (time, value) pairs" and
//! "predict at arbitrary timestamps", so any backend implementing these two
//! traits can be substituted without touching the pipeline.

use crate::error::Result;
use chrono::NaiveDateTime;

/// A seasonal model configuration that can be fitted to history.
///
/// This trait is object-safe and can be used with `Box<dyn SeasonalModel>`.
pub trait SeasonalModel {
    /// Fit the model to timestamped values.
    fn fit(&self, timestamps: &[NaiveDateTime], values: &[f64]) -> Result<BoxedFittedModel>;

    /// Get the model name.
    fn name(&self) -> &str;
}

/// A fitted model producing point estimates.
pub trait FittedModel {
    /// Point estimates at the given timestamps.
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>>;

    /// In-sample predictions, aligned with the training values.
    fn fitted_values(&self) -> &[f64];

    /// Residuals (actual - fitted), aligned with the training values.
    fn residuals(&self) -> &[f64];
}

/// Type alias for boxed model trait objects.
///
/// # Example
///
/// ```
/// use deadstock::models::{BoxedSeasonalModel, SeasonalModel, SeasonalWindowAverage};
///
/// let model: BoxedSeasonalModel = Box::new(SeasonalWindowAverage::new(168, 4));
/// assert_eq!(model.name(), "SeasonalWindowAverage");
/// ```
pub type BoxedSeasonalModel = Box<dyn SeasonalModel>;

/// Type alias for boxed fitted models.
pub type BoxedFittedModel = Box<dyn FittedModel>;
