//! Forecasting models.
//!
//! [`HybridForecaster`] blends a seasonal backend (any [`SeasonalModel`])
//! with the [`SimilarHourEstimator`].

mod traits;

pub mod additive;
pub mod hybrid;
pub mod seasonal_window;
pub mod similar_hour;

pub use additive::{AdditiveSeasonalModel, Seasonality};
pub use hybrid::{hourly_range, BlendWeights, HybridForecaster};
pub use seasonal_window::SeasonalWindowAverage;
pub use similar_hour::SimilarHourEstimator;
pub use traits::{BoxedFittedModel, BoxedSeasonalModel, FittedModel, SeasonalModel};
