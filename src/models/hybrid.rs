//! Hybrid forecast: a fitted seasonal model blended with the similar-hour
//! estimate.

use super::additive::AdditiveSeasonalModel;
use super::similar_hour::SimilarHourEstimator;
use super::traits::BoxedSeasonalModel;
use crate::core::{is_on_hour, ForecastPoint, HourlySeries};
use crate::error::{DepletionError, Result};
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

/// Blend weights for the model and similar-hour estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub model: f64,
    pub similar_hour: f64,
}

impl BlendWeights {
    /// Create weights; both must be finite and non-negative.
    pub fn new(model: f64, similar_hour: f64) -> Result<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(model) || !valid(similar_hour) {
            return Err(DepletionError::InvalidParameter(format!(
                "blend weights must be finite and non-negative, got {} and {}",
                model, similar_hour
            )));
        }
        Ok(Self {
            model,
            similar_hour,
        })
    }

    /// Weighted blend, floored at zero.
    pub fn combine(&self, model: f64, similar_hour: f64) -> f64 {
        (self.model * model + self.similar_hour * similar_hour).max(0.0)
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            model: 0.7,
            similar_hour: 0.3,
        }
    }
}

/// Every hour from `start` while `<= end`.
///
/// `start` must sit on an hour boundary; `end` may not (23:59:59 includes
/// 23:00).
pub fn hourly_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
    if end < start {
        return Err(DepletionError::InvalidParameter(format!(
            "forecast end {} is before start {}",
            end, start
        )));
    }
    if !is_on_hour(&start) {
        return Err(DepletionError::InvalidParameter(format!(
            "forecast start {} is not on an hour boundary",
            start
        )));
    }

    let hours = (end - start).num_hours();
    Ok((0..=hours).map(|h| start + Duration::hours(h)).collect())
}

/// Fits a seasonal model on history and blends its hourly predictions with
/// the similar-hour estimate.
pub struct HybridForecaster {
    model: BoxedSeasonalModel,
    estimator: SimilarHourEstimator,
    weights: BlendWeights,
}

impl HybridForecaster {
    pub fn new(model: BoxedSeasonalModel) -> Self {
        Self {
            model,
            estimator: SimilarHourEstimator::default(),
            weights: BlendWeights::default(),
        }
    }

    /// Forecaster backed by the station-tuned additive seasonal model.
    pub fn fuel_station() -> Self {
        Self::new(Box::new(AdditiveSeasonalModel::fuel_station()))
    }

    pub fn with_weights(mut self, weights: BlendWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_estimator(mut self, estimator: SimilarHourEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn weights(&self) -> BlendWeights {
        self.weights
    }

    /// Forecast every hour in `[start, end]`.
    ///
    /// The model trains on non-negative samples only; the similar-hour
    /// estimate reads the full history.
    pub fn forecast(
        &self,
        history: &HourlySeries,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ForecastPoint>> {
        let horizon = hourly_range(start, end)?;

        let (timestamps, values): (Vec<NaiveDateTime>, Vec<f64>) = history
            .iter()
            .filter(|s| s.quantity() >= 0.0)
            .map(|s| (s.timestamp(), s.quantity()))
            .unzip();
        if values.len() < 2 {
            return Err(DepletionError::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }
        let dropped = history.len() - values.len();
        if dropped > 0 {
            debug!(dropped, "negative readings excluded from model training");
        }

        let fitted = self.model.fit(&timestamps, &values)?;
        let predictions = fitted.predict(&horizon)?;
        if predictions.len() != horizon.len() {
            return Err(DepletionError::DimensionMismatch {
                expected: horizon.len(),
                got: predictions.len(),
            });
        }

        let points = horizon
            .into_iter()
            .zip(predictions)
            .map(|(timestamp, prediction)| {
                let model_estimate = prediction.max(0.0);
                let similar_hour_estimate = self.estimator.estimate_at(timestamp, history);
                ForecastPoint {
                    timestamp,
                    model_estimate,
                    similar_hour_estimate,
                    combined_estimate: self.weights.combine(model_estimate, similar_hour_estimate),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            model = self.model.name(),
            hours = points.len(),
            training = values.len(),
            "hybrid forecast complete"
        );

        Ok(points)
    }
}

impl std::fmt::Debug for HybridForecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridForecaster")
            .field("model", &self.model.name())
            .field("estimator", &self.estimator)
            .field("weights", &self.weights)
            .finish()
    }
}
