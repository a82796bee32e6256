//! Hourly consumption series and the gapped grid it is rebuilt from.

use crate::error::{DepletionError, Result};
use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use statrs::statistics::Statistics;

/// Weekday ordinal with Monday = 0 and Sunday = 6.
pub fn weekday_of(timestamp: &NaiveDateTime) -> u32 {
    timestamp.weekday().num_days_from_monday()
}

/// True when the timestamp sits exactly on an hour boundary.
pub fn is_on_hour(timestamp: &NaiveDateTime) -> bool {
    timestamp.minute() == 0 && timestamp.second() == 0 && timestamp.nanosecond() == 0
}

/// One hour of consumption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    timestamp: NaiveDateTime,
    quantity: f64,
    weekday: u32,
}

impl Sample {
    /// Create a sample; the weekday is derived from the timestamp.
    pub fn new(timestamp: NaiveDateTime, quantity: f64) -> Self {
        Self {
            timestamp,
            quantity,
            weekday: weekday_of(&timestamp),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Weekday ordinal, Monday = 0.
    pub fn weekday(&self) -> u32 {
        self.weekday
    }

    /// Hour of day, 0..=23.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// A complete hourly series: exactly one sample per hour between the first
/// and last timestamp, strictly increasing, every quantity present.
///
/// The series is never mutated in place; range selections and reindexing
/// return new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    samples: Vec<Sample>,
}

impl HourlySeries {
    /// Build a series from samples, validating the hourly invariant.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        for (i, sample) in samples.iter().enumerate() {
            if !is_on_hour(&sample.timestamp) {
                return Err(DepletionError::TimestampError(format!(
                    "sample {} at {} is not aligned to the hour",
                    i, sample.timestamp
                )));
            }
            if !sample.quantity.is_finite() {
                return Err(DepletionError::MissingValues(1));
            }
        }

        for pair in samples.windows(2) {
            if pair[1].timestamp - pair[0].timestamp != Duration::hours(1) {
                return Err(DepletionError::TimestampError(format!(
                    "samples must be contiguous hours: {} follows {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }

        Ok(Self { samples })
    }

    /// Build a series of consecutive hours starting at `start`.
    pub fn from_values(start: NaiveDateTime, values: Vec<f64>) -> Result<Self> {
        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Sample::new(start + Duration::hours(i as i64), v))
            .collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// First timestamp, if any.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.first().map(Sample::timestamp)
    }

    /// Last timestamp, if any.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.last().map(Sample::timestamp)
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.samples.iter().map(Sample::timestamp).collect()
    }

    pub fn quantities(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::quantity).collect()
    }

    /// Look up the sample at an exact timestamp.
    pub fn get(&self, timestamp: NaiveDateTime) -> Option<&Sample> {
        let start = self.start()?;
        if timestamp < start || !is_on_hour(&timestamp) {
            return None;
        }
        let offset = (timestamp - start).num_hours();
        usize::try_from(offset)
            .ok()
            .and_then(|idx| self.samples.get(idx))
    }

    /// Mean quantity over the whole series (NaN when empty).
    pub fn mean_quantity(&self) -> f64 {
        self.samples.iter().map(Sample::quantity).mean()
    }

    /// Samples strictly before `cutoff`.
    pub fn before(&self, cutoff: NaiveDateTime) -> HourlySeries {
        let samples = self
            .samples
            .iter()
            .take_while(|s| s.timestamp < cutoff)
            .copied()
            .collect();
        HourlySeries { samples }
    }

    /// Samples with `start <= timestamp <= end`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> HourlySeries {
        let samples = self
            .samples
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .copied()
            .collect();
        HourlySeries { samples }
    }

    /// Project the series onto the hourly range `[start, end]`, leaving hours
    /// the series does not cover as gaps.
    pub fn reindexed(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<HourlyGrid> {
        let mut grid = HourlyGrid::empty(start, end)?;
        for sample in &self.samples {
            grid.set(sample.timestamp, sample.quantity);
        }
        Ok(grid)
    }
}

impl<'a> IntoIterator for &'a HourlySeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// A contiguous hourly grid whose quantities may be missing.
///
/// This is the intermediate shape between raw readings and a complete
/// [`HourlySeries`]; the fill steps return new grids.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyGrid {
    start: NaiveDateTime,
    quantities: Vec<Option<f64>>,
}

impl HourlyGrid {
    /// A grid covering `[start, end]` with every hour missing.
    pub fn empty(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if !is_on_hour(&start) || !is_on_hour(&end) {
            return Err(DepletionError::TimestampError(
                "grid bounds must be aligned to the hour".to_string(),
            ));
        }
        if end < start {
            return Err(DepletionError::InvalidParameter(
                "grid end must not precede start".to_string(),
            ));
        }
        let hours = (end - start).num_hours() as usize + 1;
        Ok(Self {
            start,
            quantities: vec![None; hours],
        })
    }

    /// Set the quantity at `timestamp`. Returns false when it lies off the grid.
    pub fn set(&mut self, timestamp: NaiveDateTime, quantity: f64) -> bool {
        match self.index_of(timestamp) {
            Some(idx) => {
                self.quantities[idx] = Some(quantity);
                true
            }
            None => false,
        }
    }

    fn index_of(&self, timestamp: NaiveDateTime) -> Option<usize> {
        if timestamp < self.start || !is_on_hour(&timestamp) {
            return None;
        }
        let idx = (timestamp - self.start).num_hours() as usize;
        (idx < self.quantities.len()).then_some(idx)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn quantities(&self) -> &[Option<f64>] {
        &self.quantities
    }

    pub fn timestamp_at(&self, idx: usize) -> NaiveDateTime {
        self.start + Duration::hours(idx as i64)
    }

    /// Number of hours without a quantity.
    pub fn missing_count(&self) -> usize {
        self.quantities.iter().filter(|q| q.is_none()).count()
    }

    /// Fill interior gaps by linear interpolation in time between the
    /// nearest known neighbours. Leading and trailing gaps stay missing.
    pub fn interpolated(&self) -> HourlyGrid {
        let mut result = self.quantities.clone();
        let n = result.len();

        let mut i = 0;
        while i < n {
            if result[i].is_some() {
                i += 1;
                continue;
            }
            let gap_start = i;
            while i < n && result[i].is_none() {
                i += 1;
            }
            let gap_end = i;

            let left = gap_start.checked_sub(1).and_then(|l| result[l]);
            let right = result.get(gap_end).copied().flatten();

            if let (Some(l), Some(r)) = (left, right) {
                // Grid spacing is uniform, so index distance is time distance.
                let span = (gap_end - gap_start + 1) as f64;
                for (j, idx) in (gap_start..gap_end).enumerate() {
                    let t = (j + 1) as f64 / span;
                    result[idx] = Some(l + t * (r - l));
                }
            }
        }

        HourlyGrid {
            start: self.start,
            quantities: result,
        }
    }

    /// Fill remaining gaps from the next known value, then any still-missing
    /// tail from the previous known value.
    pub fn edge_filled(&self) -> HourlyGrid {
        let mut result = self.quantities.clone();

        let mut next_known = None;
        for q in result.iter_mut().rev() {
            if let Some(v) = *q {
                next_known = Some(v);
            } else {
                *q = next_known;
            }
        }

        let mut prev_known = None;
        for q in result.iter_mut() {
            if let Some(v) = *q {
                prev_known = Some(v);
            } else {
                *q = prev_known;
            }
        }

        HourlyGrid {
            start: self.start,
            quantities: result,
        }
    }

    /// Convert into a complete series, failing if any hour is still missing.
    pub fn into_series(self) -> Result<HourlySeries> {
        let missing = self.missing_count();
        if missing > 0 {
            return Err(DepletionError::MissingValues(missing));
        }
        let start = self.start;
        let samples = self
            .quantities
            .into_iter()
            .enumerate()
            .map(|(i, q)| Sample::new(start + Duration::hours(i as i64), q.unwrap_or_default()))
            .collect();
        HourlySeries::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn sample_derives_weekday_from_timestamp() {
        // 2024-10-21 was a Monday.
        let monday = Sample::new(at(21, 7), 12.5);
        assert_eq!(monday.weekday(), 0);
        assert_eq!(monday.hour(), 7);

        let sunday = Sample::new(at(20, 23), 1.0);
        assert_eq!(sunday.weekday(), 6);
    }

    #[test]
    fn series_requires_contiguous_hours() {
        let ok = HourlySeries::new(vec![Sample::new(at(1, 0), 1.0), Sample::new(at(1, 1), 2.0)]);
        assert!(ok.is_ok());

        let gap = HourlySeries::new(vec![Sample::new(at(1, 0), 1.0), Sample::new(at(1, 2), 2.0)]);
        assert!(matches!(gap, Err(DepletionError::TimestampError(_))));

        let duplicate =
            HourlySeries::new(vec![Sample::new(at(1, 0), 1.0), Sample::new(at(1, 0), 2.0)]);
        assert!(duplicate.is_err());
    }

    #[test]
    fn series_rejects_unaligned_and_missing_values() {
        let unaligned = at(1, 0) + Duration::minutes(30);
        assert!(HourlySeries::new(vec![Sample::new(unaligned, 1.0)]).is_err());

        let nan = HourlySeries::new(vec![Sample::new(at(1, 0), f64::NAN)]);
        assert!(matches!(nan, Err(DepletionError::MissingValues(1))));
    }

    #[test]
    fn series_range_selection() {
        let series = HourlySeries::from_values(at(1, 0), (0..48).map(f64::from).collect()).unwrap();

        let head = series.before(at(2, 0));
        assert_eq!(head.len(), 24);
        assert_eq!(head.end(), Some(at(1, 23)));

        let window = series.between(at(1, 12), at(2, 0));
        assert_eq!(window.len(), 13);
        assert_eq!(window.start(), Some(at(1, 12)));
        assert_eq!(window.end(), Some(at(2, 0)));

        assert!(series.before(at(1, 0)).is_empty());
    }

    #[test]
    fn series_lookup_by_timestamp() {
        let series = HourlySeries::from_values(at(1, 0), vec![5.0, 6.0, 7.0]).unwrap();
        assert_eq!(series.get(at(1, 2)).map(Sample::quantity), Some(7.0));
        assert!(series.get(at(1, 3)).is_none());
        assert!(series.get(at(1, 0) + Duration::minutes(5)).is_none());
    }

    #[test]
    fn series_mean_quantity() {
        let series = HourlySeries::from_values(at(1, 0), vec![2.0, 4.0, 9.0]).unwrap();
        assert_relative_eq!(series.mean_quantity(), 5.0, epsilon = 1e-12);
        assert!(HourlySeries::default().mean_quantity().is_nan());
    }

    #[test]
    fn reindexing_complete_series_is_noop() {
        let series = HourlySeries::from_values(at(1, 0), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let grid = series.reindexed(at(1, 0), at(1, 3)).unwrap();
        assert_eq!(grid.missing_count(), 0);
        assert_eq!(grid.into_series().unwrap(), series);
    }

    #[test]
    fn reindexing_wider_range_leaves_gaps() {
        let series = HourlySeries::from_values(at(1, 2), vec![1.0, 2.0]).unwrap();
        let grid = series.reindexed(at(1, 0), at(1, 5)).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.missing_count(), 4);
        assert_eq!(grid.quantities()[2], Some(1.0));
    }

    #[test]
    fn grid_interpolates_interior_gaps() {
        let mut grid = HourlyGrid::empty(at(1, 0), at(1, 4)).unwrap();
        grid.set(at(1, 0), 1.0);
        grid.set(at(1, 3), 4.0);
        grid.set(at(1, 4), 5.0);

        let filled = grid.interpolated();
        let q: Vec<f64> = filled.quantities().iter().map(|v| v.unwrap()).collect();
        assert_relative_eq!(q[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(q[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn grid_single_gap_takes_midpoint() {
        let mut grid = HourlyGrid::empty(at(1, 0), at(1, 2)).unwrap();
        grid.set(at(1, 0), 10.0);
        grid.set(at(1, 2), 20.0);
        let series = grid.interpolated().into_series().unwrap();
        assert_relative_eq!(series.samples()[1].quantity(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_edge_fill_prefers_next_known_value() {
        let mut grid = HourlyGrid::empty(at(1, 0), at(1, 4)).unwrap();
        grid.set(at(1, 2), 3.0);
        grid.set(at(1, 3), 4.0);

        let interpolated = grid.interpolated();
        assert_eq!(interpolated.missing_count(), 3);

        let filled = interpolated.edge_filled();
        assert_eq!(
            filled.quantities(),
            &[Some(3.0), Some(3.0), Some(3.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn grid_with_no_values_stays_missing() {
        let grid = HourlyGrid::empty(at(1, 0), at(1, 2)).unwrap();
        let filled = grid.interpolated().edge_filled();
        assert_eq!(filled.missing_count(), 3);
        assert!(matches!(
            filled.into_series(),
            Err(DepletionError::MissingValues(3))
        ));
    }

    #[test]
    fn grid_ignores_points_outside_range() {
        let mut grid = HourlyGrid::empty(at(1, 0), at(1, 1)).unwrap();
        assert!(!grid.set(at(1, 5), 1.0));
        assert!(!grid.set(at(1, 0) - Duration::hours(1), 1.0));
        assert!(grid.set(at(1, 1), 1.0));
    }

    #[test]
    fn grid_rejects_inverted_bounds() {
        assert!(HourlyGrid::empty(at(2, 0), at(1, 0)).is_err());
    }
}
