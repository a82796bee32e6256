//! Additive trend plus Fourier seasonality model.
//!
//! The series is decomposed as
//!
//! ```text
//! y(t) = k*t + m + sum_j delta_j * (t - c_j)+ + sum_s fourier_s(t)
//! ```
//!
//! with a piecewise linear trend whose slope may change at `c_j`, and one
//! block of sine/cosine pairs per seasonality. Coefficients are the MAP
//! estimate under Gaussian priors, solved as penalized least squares in a
//! scaled space (`y / max|y|`, time mapped to `[0, 1]`).
//!
//! Seasonality periods are expressed in days and the Fourier terms are
//! evaluated on days since the Unix epoch, so the phase of a seasonality
//! does not depend on where the training window starts.

use super::traits::{BoxedFittedModel, FittedModel, SeasonalModel};
use crate::error::{DepletionError, Result};
use crate::utils::ridge::{predict_row, ridge_fit};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::f64::consts::PI;
use tracing::debug;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Prior scale on the intercept and base slope.
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Ridge used by the pilot fit that estimates the noise level.
const PILOT_RIDGE: f64 = 1e-6;
/// Lower bound on the scaled noise variance.
const MIN_NOISE_VARIANCE: f64 = 1e-4;

/// A periodic component represented by a truncated Fourier series.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: String,
    /// Period in days.
    pub period: f64,
    pub fourier_order: usize,
}

impl Seasonality {
    pub fn new(name: impl Into<String>, period: f64, fourier_order: usize) -> Self {
        Self {
            name: name.into(),
            period,
            fourier_order,
        }
    }

    fn push_features(&self, days: f64, row: &mut Vec<f64>) {
        for k in 1..=self.fourier_order {
            let angle = 2.0 * PI * k as f64 * days / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
}

/// Additive seasonal model configuration.
///
/// # Example
///
/// ```
/// use deadstock::models::AdditiveSeasonalModel;
///
/// let model = AdditiveSeasonalModel::fuel_station();
/// let names: Vec<_> = model.seasonalities().into_iter().map(|s| s.name).collect();
/// assert_eq!(names, ["yearly", "weekly", "daily", "hourly"]);
/// ```
#[derive(Debug, Clone)]
pub struct AdditiveSeasonalModel {
    n_changepoints: usize,
    changepoint_range: f64,
    changepoint_prior_scale: f64,
    seasonality_prior_scale: f64,
    yearly: bool,
    weekly: bool,
    daily: bool,
    custom: Vec<Seasonality>,
}

impl AdditiveSeasonalModel {
    /// Model with yearly, weekly and daily seasonality and 25 changepoints.
    pub fn new() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly: true,
            weekly: true,
            daily: true,
            custom: Vec::new(),
        }
    }

    /// Configuration used for station consumption: explicit weekly and
    /// daily terms over the built-ins plus a 24-period term of order 15.
    pub fn fuel_station() -> Self {
        Self::new()
            .add_seasonality("weekly", 7.0, 3)
            .add_seasonality("daily", 1.0, 5)
            .add_seasonality("hourly", 24.0, 15)
    }

    pub fn with_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range.clamp(0.0, 1.0);
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_seasonality_prior_scale(mut self, scale: f64) -> Self {
        self.seasonality_prior_scale = scale;
        self
    }

    pub fn with_yearly(mut self, enabled: bool) -> Self {
        self.yearly = enabled;
        self
    }

    pub fn with_weekly(mut self, enabled: bool) -> Self {
        self.weekly = enabled;
        self
    }

    pub fn with_daily(mut self, enabled: bool) -> Self {
        self.daily = enabled;
        self
    }

    /// Add a custom seasonality. A custom term replaces a built-in one with
    /// the same name, and a later custom term replaces an earlier one.
    pub fn add_seasonality(mut self, name: &str, period: f64, fourier_order: usize) -> Self {
        self.custom.retain(|s| s.name != name);
        self.custom.push(Seasonality::new(name, period, fourier_order));
        self
    }

    /// Effective seasonalities in feature order.
    pub fn seasonalities(&self) -> Vec<Seasonality> {
        let builtins = [
            (self.yearly, Seasonality::new("yearly", 365.25, 10)),
            (self.weekly, Seasonality::new("weekly", 7.0, 3)),
            (self.daily, Seasonality::new("daily", 1.0, 4)),
        ];

        let mut result: Vec<Seasonality> = builtins
            .into_iter()
            .filter(|(enabled, s)| *enabled && !self.custom.iter().any(|c| c.name == s.name))
            .map(|(_, s)| s)
            .collect();
        result.extend(self.custom.iter().cloned());
        result
    }

    fn validate(&self) -> Result<()> {
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if !positive(self.changepoint_prior_scale) || !positive(self.seasonality_prior_scale) {
            return Err(DepletionError::InvalidParameter(
                "prior scales must be positive".into(),
            ));
        }
        if let Some(s) = self
            .custom
            .iter()
            .find(|s| !positive(s.period) || s.fourier_order == 0)
        {
            return Err(DepletionError::InvalidParameter(format!(
                "seasonality '{}' needs a positive period and order",
                s.name
            )));
        }
        Ok(())
    }
}

impl Default for AdditiveSeasonalModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonalModel for AdditiveSeasonalModel {
    fn fit(&self, timestamps: &[NaiveDateTime], values: &[f64]) -> Result<BoxedFittedModel> {
        self.validate()?;

        let n = values.len();
        if timestamps.len() != n {
            return Err(DepletionError::DimensionMismatch {
                expected: timestamps.len(),
                got: n,
            });
        }
        if n < 2 {
            return Err(DepletionError::InsufficientData { needed: 2, got: n });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DepletionError::InvalidParameter(
                "training values must be finite".into(),
            ));
        }
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(DepletionError::TimestampError(
                "training timestamps must be strictly increasing".into(),
            ));
        }

        let origin = timestamps[0];
        let span_seconds = (timestamps[n - 1] - origin).num_seconds() as f64;
        let y_scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let mut fitted_model = FittedAdditiveModel {
            origin,
            span_seconds,
            y_scale,
            changepoints: Vec::new(),
            seasonalities: self.seasonalities(),
            beta: Vec::new(),
            fitted: Vec::new(),
            residuals: Vec::new(),
        };

        let t: Vec<f64> = timestamps.iter().map(|ts| fitted_model.scaled_time(ts)).collect();
        fitted_model.changepoints =
            select_changepoints(&t, self.n_changepoints, self.changepoint_range);

        let rows: Vec<Vec<f64>> = timestamps
            .iter()
            .zip(&t)
            .map(|(ts, &ti)| fitted_model.features(ts, ti))
            .collect();
        let y: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let n_cp = fitted_model.changepoints.len();
        let p = rows[0].len();

        // Pilot fit: estimate the noise level that sets the prior strength.
        let pilot = ridge_fit(&rows, &y, &vec![PILOT_RIDGE; p])?;
        let sigma2 = (rows
            .iter()
            .zip(&y)
            .map(|(row, yi)| (yi - predict_row(row, &pilot)).powi(2))
            .sum::<f64>()
            / n as f64)
            .max(MIN_NOISE_VARIANCE);

        let penalties: Vec<f64> = (0..p)
            .map(|j| {
                let scale = if j < 2 {
                    TREND_PRIOR_SCALE
                } else if j < 2 + n_cp {
                    self.changepoint_prior_scale
                } else {
                    self.seasonality_prior_scale
                };
                sigma2 / (scale * scale)
            })
            .collect();
        fitted_model.beta = ridge_fit(&rows, &y, &penalties)?;

        fitted_model.fitted = rows
            .iter()
            .map(|row| predict_row(row, &fitted_model.beta) * y_scale)
            .collect();
        fitted_model.residuals = values
            .iter()
            .zip(&fitted_model.fitted)
            .map(|(v, f)| v - f)
            .collect();

        debug!(
            observations = n,
            changepoints = n_cp,
            features = p,
            noise_variance = sigma2,
            "fitted additive seasonal model"
        );

        Ok(Box::new(fitted_model))
    }

    fn name(&self) -> &str {
        "AdditiveSeasonal"
    }
}

/// Changepoints spread uniformly over the first `range` share of history.
fn select_changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let n = n_changepoints.min(hist_size.saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }

    let step = (hist_size - 1) as f64 / n as f64;
    (1..=n)
        .map(|i| t[(i as f64 * step).round() as usize])
        .collect()
}

fn epoch_days(ts: &NaiveDateTime) -> f64 {
    (ts.date().num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64
        + ts.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}

struct FittedAdditiveModel {
    origin: NaiveDateTime,
    span_seconds: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    beta: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedAdditiveModel {
    fn scaled_time(&self, ts: &NaiveDateTime) -> f64 {
        (*ts - self.origin).num_seconds() as f64 / self.span_seconds
    }

    fn features(&self, ts: &NaiveDateTime, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.beta.len().max(2));
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|c| (t - c).max(0.0)));

        let days = epoch_days(ts);
        for s in &self.seasonalities {
            s.push_features(days, &mut row);
        }
        row
    }
}

impl FittedModel for FittedAdditiveModel {
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Vec<f64>> {
        Ok(timestamps
            .iter()
            .map(|ts| {
                let row = self.features(ts, self.scaled_time(ts));
                predict_row(&row, &self.beta) * self.y_scale
            })
            .collect())
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn hours_from(start: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
        (0..n).map(|i| start + Duration::hours(i as i64)).collect()
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn epoch_days_counts_from_1970() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_relative_eq!(epoch_days(&epoch), 0.5);
    }

    #[test]
    fn custom_seasonality_replaces_builtin_with_same_name() {
        let model = AdditiveSeasonalModel::new().add_seasonality("weekly", 7.0, 8);
        let seasonalities = model.seasonalities();
        let weekly: Vec<_> = seasonalities.iter().filter(|s| s.name == "weekly").collect();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].fourier_order, 8);
        assert_eq!(seasonalities.len(), 3);
    }

    #[test]
    fn builtin_and_fuel_station_orders() {
        let orders = |model: &AdditiveSeasonalModel| -> Vec<(String, f64, usize)> {
            model
                .seasonalities()
                .into_iter()
                .map(|s| (s.name, s.period, s.fourier_order))
                .collect()
        };

        let builtin = orders(&AdditiveSeasonalModel::new());
        assert_eq!(builtin[2], ("daily".to_string(), 1.0, 4));

        let station = orders(&AdditiveSeasonalModel::fuel_station());
        assert_eq!(
            station,
            vec![
                ("yearly".to_string(), 365.25, 10),
                ("weekly".to_string(), 7.0, 3),
                ("daily".to_string(), 1.0, 5),
                ("hourly".to_string(), 24.0, 15),
            ]
        );
    }

    #[test]
    fn disabled_builtins_are_dropped() {
        let model = AdditiveSeasonalModel::new()
            .with_yearly(false)
            .with_weekly(false);
        let names: Vec<_> = model.seasonalities().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["daily"]);
    }

    #[test]
    fn changepoints_cover_first_part_of_history() {
        let t: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let cps = select_changepoints(&t, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8));
        assert!(cps.windows(2).all(|w| w[1] > w[0]));

        assert!(select_changepoints(&t[..2], 25, 0.8).is_empty());
    }

    #[test]
    fn recovers_daily_cycle() {
        let timestamps = hours_from(start(), 24 * 21);
        let values: Vec<f64> = (0..timestamps.len())
            .map(|i| 30.0 + 10.0 * (2.0 * PI * i as f64 / 24.0).sin())
            .collect();

        let model = AdditiveSeasonalModel::new().with_yearly(false);
        let fitted = model.fit(&timestamps, &values).unwrap();

        let future = hours_from(start() + Duration::days(21), 24);
        let predictions = fitted.predict(&future).unwrap();
        for (i, p) in predictions.iter().enumerate() {
            let expected = 30.0 + 10.0 * (2.0 * PI * i as f64 / 24.0).sin();
            assert!((p - expected).abs() < 0.5, "hour {}: {} vs {}", i, p, expected);
        }
    }

    #[test]
    fn extrapolates_linear_trend() {
        let timestamps = hours_from(start(), 240);
        let values: Vec<f64> = (0..240).map(|i| 10.0 + 0.1 * i as f64).collect();

        let model = AdditiveSeasonalModel::new()
            .with_yearly(false)
            .with_weekly(false)
            .with_daily(false);
        let fitted = model.fit(&timestamps, &values).unwrap();

        let next = fitted.predict(&[start() + Duration::hours(240)]).unwrap();
        assert_relative_eq!(next[0], 34.0, epsilon = 0.1);

        for r in fitted.residuals() {
            assert!(r.abs() < 0.1);
        }
    }

    #[test]
    fn fuel_station_model_fits_hourly_history() {
        let timestamps = hours_from(start(), 24 * 28);
        let values: Vec<f64> = (0..timestamps.len())
            .map(|i| 40.0 + 15.0 * (2.0 * PI * i as f64 / 24.0).cos())
            .collect();

        let fitted = AdditiveSeasonalModel::fuel_station()
            .fit(&timestamps, &values)
            .unwrap();
        let predictions = fitted
            .predict(&hours_from(start() + Duration::days(28), 24))
            .unwrap();

        assert!(predictions.iter().all(|p| p.is_finite()));
        let mean = predictions.iter().sum::<f64>() / 24.0;
        assert!((mean - 40.0).abs() < 5.0, "mean {}", mean);
    }

    #[test]
    fn fit_validates_input() {
        let model = AdditiveSeasonalModel::new();
        let ts = hours_from(start(), 3);

        assert!(matches!(
            model.fit(&ts[..1], &[1.0]),
            Err(DepletionError::InsufficientData { .. })
        ));
        assert!(model.fit(&ts, &[1.0, f64::NAN, 2.0]).is_err());

        let unordered = vec![ts[1], ts[0], ts[2]];
        assert!(model.fit(&unordered, &[1.0, 2.0, 3.0]).is_err());

        let bad = AdditiveSeasonalModel::new().add_seasonality("broken", 0.0, 3);
        assert!(bad.fit(&ts, &[1.0, 2.0, 3.0]).is_err());
    }
}
