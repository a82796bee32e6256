//! End-to-end run: readings to depletion forecast and accuracy report.

use crate::config::{ModelBackend, PipelineConfig};
use crate::core::{ForecastPoint, HourlySeries, RawReading};
use crate::error::{DepletionError, Result};
use crate::io::{ReadingQuery, ReadingSource};
use crate::models::{
    AdditiveSeasonalModel, BoxedSeasonalModel, HybridForecaster, SeasonalWindowAverage,
    SimilarHourEstimator,
};
use crate::simulation::{DepletionOutcome, DepletionSimulator};
use crate::transform::SeriesNormalizer;
use crate::utils::{AccuracyEvaluator, AccuracyReport};
use tracing::info;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Complete hourly series reconstructed from the readings.
    pub series: HourlySeries,
    pub filled_hours: usize,
    pub forecast: Vec<ForecastPoint>,
    pub depletion: DepletionOutcome,
    pub accuracy: AccuracyReport,
}

/// Wires normalization, forecasting, simulation and evaluation together.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    forecaster: HybridForecaster,
    simulator: DepletionSimulator,
    evaluator: AccuracyEvaluator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let model: BoxedSeasonalModel = match config.backend {
            ModelBackend::Additive => Box::new(AdditiveSeasonalModel::fuel_station()),
            ModelBackend::SeasonalWindow => {
                Box::new(SeasonalWindowAverage::new(168, config.seasonal_window_weeks))
            }
        };
        let estimator = SimilarHourEstimator::new(config.similar_hour_window);

        let forecaster = HybridForecaster::new(model)
            .with_weights(config.weights()?)
            .with_estimator(estimator);
        let simulator = DepletionSimulator::new(config.initial_volume, config.dead_stock)?
            .with_max_extra_iterations(config.max_extra_iterations)
            .with_estimator(estimator);
        let evaluator = AccuracyEvaluator::new(config.accuracy_start, config.accuracy_end)?;

        Ok(Self {
            config,
            forecaster,
            simulator,
            evaluator,
        })
    }

    /// Replace the seasonal backend.
    pub fn with_model(mut self, model: BoxedSeasonalModel) -> Self {
        let weights = self.forecaster.weights();
        self.forecaster = HybridForecaster::new(model)
            .with_weights(weights)
            .with_estimator(SimilarHourEstimator::new(self.config.similar_hour_window));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the seasonal backend in use.
    pub fn model_name(&self) -> &str {
        self.forecaster.model_name()
    }

    /// Fetch readings for `query` and run on them.
    pub fn run_from_source<S: ReadingSource + ?Sized>(
        &self,
        source: &S,
        query: &ReadingQuery,
    ) -> Result<RunReport> {
        let readings = source.fetch(query)?;
        if readings.is_empty() {
            return Err(DepletionError::EmptyInput);
        }
        self.run(&readings)
    }

    pub fn run(&self, readings: &[RawReading]) -> Result<RunReport> {
        let cfg = &self.config;

        let normalized = SeriesNormalizer::new().normalize(readings)?;
        let series = normalized.series;
        info!(
            rows = readings.len(),
            hours = series.len(),
            filled = normalized.filled_hours,
            "normalized readings"
        );

        let history = series.before(cfg.history_cutoff);
        if history.is_empty() {
            return Err(DepletionError::InsufficientData { needed: 2, got: 0 });
        }
        let actual = series.between(cfg.actual_start, cfg.actual_end);

        let forecast = self
            .forecaster
            .forecast(&history, cfg.forecast_start, cfg.forecast_end)?;
        info!(
            model = self.forecaster.model_name(),
            hours = forecast.len(),
            training_hours = history.len(),
            "forecast ready"
        );

        let depletion = self
            .simulator
            .simulate_from(cfg.forecast_start, &forecast, &history)?;
        match (depletion.crossing, depletion.crossing_time()) {
            (Some(point), Some(at)) => info!(
                %at,
                level = point.remaining_level,
                hours = point.hours_consumed,
                extension_steps = depletion.extension_steps,
                "dead stock crossing found"
            ),
            _ => info!(
                extension_steps = depletion.extension_steps,
                final_level = ?depletion.final_level(),
                "dead stock not reached"
            ),
        }

        let accuracy = self.evaluator.evaluate(&depletion.points, &actual);
        info!(
            average = ?accuracy.window_average,
            contributing = accuracy.contributing,
            "accuracy evaluated"
        );

        Ok(RunReport {
            series,
            filled_hours: normalized.filled_hours,
            forecast,
            depletion,
            accuracy,
        })
    }
}
