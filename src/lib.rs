//! # deadstock
//!
//! Hourly fuel tank depletion forecasting.
//!
//! Rebuilds a complete hourly consumption series from raw readings, blends a
//! seasonal model with a same-weekday-and-hour average, simulates the tank
//! level down to dead stock and scores the forecast against actual
//! consumption.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::needless_range_loop)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod core;
pub mod error;
pub mod fuel;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod simulation;
pub mod transform;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DepletionError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{DepletionPoint, ForecastPoint, HourlySeries, RawReading};
    pub use crate::error::{DepletionError, Result};
    pub use crate::fuel::FuelType;
    pub use crate::models::{HybridForecaster, SeasonalModel, SimilarHourEstimator};
    pub use crate::pipeline::{Pipeline, RunReport};
    pub use crate::simulation::{DepletionSimulator, SimulationStatus};
    pub use crate::utils::{ratio_accuracy, AccuracyEvaluator};
}
