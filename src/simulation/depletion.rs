//! Tank level simulation down to dead stock.
//!
//! Levels are the initial volume minus the running sum of hourly consumption.
//! When the forecast window ends above dead stock, the simulation keeps
//! stepping one hour at a time with the similar-hour estimate until the level
//! reaches dead stock or the step cap is hit.

use crate::core::{DepletionPoint, ForecastPoint, HourlySeries, PointOrigin};
use crate::error::{DepletionError, Result};
use crate::models::SimilarHourEstimator;
use crate::transform::expanding_sum;
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

/// Default bound on hours appended past the forecast window.
pub const DEFAULT_MAX_EXTRA_ITERATIONS: usize = 1000;

/// How the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    /// The level reached dead stock.
    Crossed,
    /// The step cap was hit with the level still above dead stock.
    CapReached,
}

/// Simulated level sequence and its dead-stock crossing.
#[derive(Debug, Clone)]
pub struct DepletionOutcome {
    pub points: Vec<DepletionPoint>,
    /// First point whose level is at or below dead stock.
    pub crossing: Option<DepletionPoint>,
    /// Number of points appended after the forecast window.
    pub extension_steps: usize,
    pub status: SimulationStatus,
}

impl DepletionOutcome {
    /// Moment the level reaches dead stock: the end of the crossing hour.
    pub fn crossing_time(&self) -> Option<NaiveDateTime> {
        self.crossing.map(|p| p.ends_at())
    }

    /// Level after the last simulated hour.
    pub fn final_level(&self) -> Option<f64> {
        self.points.last().map(|p| p.remaining_level)
    }
}

/// Projects tank levels from a hybrid forecast.
#[derive(Debug, Clone)]
pub struct DepletionSimulator {
    initial_volume: f64,
    dead_stock: f64,
    max_extra_iterations: usize,
    estimator: SimilarHourEstimator,
}

impl DepletionSimulator {
    pub fn new(initial_volume: f64, dead_stock: f64) -> Result<Self> {
        if !initial_volume.is_finite() || !dead_stock.is_finite() {
            return Err(DepletionError::InvalidParameter(format!(
                "volumes must be finite, got initial {} and dead stock {}",
                initial_volume, dead_stock
            )));
        }
        Ok(Self {
            initial_volume,
            dead_stock,
            max_extra_iterations: DEFAULT_MAX_EXTRA_ITERATIONS,
            estimator: SimilarHourEstimator::default(),
        })
    }

    pub fn with_max_extra_iterations(mut self, cap: usize) -> Self {
        self.max_extra_iterations = cap;
        self
    }

    pub fn with_estimator(mut self, estimator: SimilarHourEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn initial_volume(&self) -> f64 {
        self.initial_volume
    }

    pub fn dead_stock(&self) -> f64 {
        self.dead_stock
    }

    /// Simulate from a non-empty forecast.
    pub fn simulate(
        &self,
        forecast: &[ForecastPoint],
        history: &HourlySeries,
    ) -> Result<DepletionOutcome> {
        let start = forecast
            .first()
            .map(|p| p.timestamp)
            .ok_or_else(|| {
                DepletionError::InvalidParameter("cannot simulate an empty forecast".into())
            })?;
        self.simulate_from(start, forecast, history)
    }

    /// Simulate, extending from `start` with the initial volume when the
    /// forecast is empty.
    pub fn simulate_from(
        &self,
        start: NaiveDateTime,
        forecast: &[ForecastPoint],
        history: &HourlySeries,
    ) -> Result<DepletionOutcome> {
        let consumption: Vec<f64> = forecast.iter().map(|p| p.combined_estimate).collect();
        let drawn = expanding_sum(&consumption);

        let mut points: Vec<DepletionPoint> = forecast
            .iter()
            .zip(&drawn)
            .enumerate()
            .map(|(i, (p, total))| DepletionPoint {
                timestamp: p.timestamp,
                consumption_estimate: p.combined_estimate,
                remaining_level: self.initial_volume - total,
                origin: PointOrigin::Forecast,
                hours_consumed: i + 1,
            })
            .collect();

        let (mut next, mut level) = match points.last() {
            Some(last) => (last.timestamp + Duration::hours(1), last.remaining_level),
            None => (start, self.initial_volume),
        };

        let mut extension_steps = 0;
        while level > self.dead_stock && extension_steps < self.max_extra_iterations {
            if history.is_empty() {
                return Err(DepletionError::InsufficientData { needed: 1, got: 0 });
            }
            let estimate = self.estimator.estimate_at(next, history);
            if !estimate.is_finite() {
                return Err(DepletionError::ComputationError(format!(
                    "non-finite consumption estimate at {}",
                    next
                )));
            }

            level -= estimate;
            points.push(DepletionPoint {
                timestamp: next,
                consumption_estimate: estimate,
                remaining_level: level,
                origin: PointOrigin::Extension,
                hours_consumed: points.len() + 1,
            });
            extension_steps += 1;
            next += Duration::hours(1);
        }

        let crossing = points
            .iter()
            .find(|p| p.remaining_level <= self.dead_stock)
            .copied();

        let status = if level > self.dead_stock {
            warn!(
                cap = self.max_extra_iterations,
                level,
                dead_stock = self.dead_stock,
                "dead stock not reached within the extension cap"
            );
            SimulationStatus::CapReached
        } else {
            SimulationStatus::Crossed
        };

        debug!(
            points = points.len(),
            extension_steps,
            ?status,
            "depletion simulation complete"
        );

        Ok(DepletionOutcome {
            points,
            crossing,
            extension_steps,
            status,
        })
    }
}
