//! Reconstruction of a complete hourly series from raw source rows.
//!
//! Source rows carry a calendar date and an hour in 1..=24, may repeat the
//! same hour and may skip hours entirely. Normalization turns them into an
//! [`HourlySeries`] covering whole days:
//!
//! 1. parse dates (any failure aborts with the offending rows),
//! 2. map hour 24 to hour 0 of the next day,
//! 3. sum duplicate hours,
//! 4. reindex onto `[midnight(first), midnight(last) + 1 day]`,
//! 5. interpolate interior gaps in time, then fill the edges.

use crate::core::{HourlyGrid, HourlySeries, RawReading};
use crate::error::{DepletionError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d.%m.%Y %H:%M:%S"];

/// Parse a source date, truncating any time-of-day part.
pub fn parse_reading_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Combine a date with a source hour.
///
/// Hour 24 is midnight of the following day; hours 0..=23 are used as-is.
/// Returns `None` for hours above 24.
pub fn normalize_hour(date: NaiveDate, hour: u32) -> Option<NaiveDateTime> {
    match hour {
        24 => date.succ_opt()?.and_hms_opt(0, 0, 0),
        0..=23 => date.and_hms_opt(hour, 0, 0),
        _ => None,
    }
}

/// Result of normalizing a batch of readings.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub series: HourlySeries,
    /// Hours whose quantity was interpolated or propagated.
    pub filled_hours: usize,
    /// Rows folded into an hour that already had a reading.
    pub merged_duplicates: usize,
}

/// Turns raw readings into a complete hourly series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize readings into a gap-free hourly series.
    ///
    /// Fails with [`DepletionError::EmptyInput`] for no readings,
    /// [`DepletionError::InvalidTimestamp`] listing every row whose date does
    /// not parse, otherwise [`DepletionError::InvalidHour`] listing every row
    /// with an hour above 24.
    pub fn normalize(&self, readings: &[RawReading]) -> Result<Normalized> {
        if readings.is_empty() {
            return Err(DepletionError::EmptyInput);
        }

        let timestamped = Self::timestamp_readings(readings)?;

        let mut by_hour: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
        let mut merged_duplicates = 0;
        for (timestamp, quantity) in timestamped {
            by_hour
                .entry(timestamp)
                .and_modify(|q| {
                    *q += quantity;
                    merged_duplicates += 1;
                })
                .or_insert(quantity);
        }

        let (first, last) = match (by_hour.keys().next(), by_hour.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(DepletionError::EmptyInput),
        };
        let start = midnight(first.date());
        let end = midnight(first_day_after(last.date())?);

        let mut grid = HourlyGrid::empty(start, end)?;
        for (timestamp, quantity) in &by_hour {
            grid.set(*timestamp, *quantity);
        }

        let filled_hours = grid.missing_count();
        if filled_hours > 0 {
            warn!(
                missing = filled_hours,
                "missing hourly quantities, filling from neighbouring hours"
            );
        }
        let series = grid.interpolated().edge_filled().into_series()?;

        debug!(
            hours = series.len(),
            duplicates = merged_duplicates,
            %start,
            %end,
            "normalized consumption series"
        );

        Ok(Normalized {
            series,
            filled_hours,
            merged_duplicates,
        })
    }

    /// Timestamp every reading, collecting all rows with an unparsable date
    /// or an hour above 24 before failing.
    fn timestamp_readings(readings: &[RawReading]) -> Result<Vec<(NaiveDateTime, f64)>> {
        let mut bad_dates = Vec::new();
        let mut bad_hours = Vec::new();
        let mut timestamped = Vec::with_capacity(readings.len());

        for (row, reading) in readings.iter().enumerate() {
            let Some(date) = parse_reading_date(&reading.date) else {
                bad_dates.push(format!("row {}: {:?}", row, reading.date));
                continue;
            };
            match normalize_hour(date, reading.hour) {
                Some(timestamp) => timestamped.push((timestamp, reading.quantity)),
                None => bad_hours.push(format!("row {}: hour {}", row, reading.hour)),
            }
        }

        if !bad_dates.is_empty() {
            warn!(
                count = bad_dates.len(),
                rows = %bad_dates.join("; "),
                "unparsable dates in source data"
            );
        }
        if !bad_hours.is_empty() {
            warn!(
                count = bad_hours.len(),
                rows = %bad_hours.join("; "),
                "hours above 24 in source data"
            );
        }

        if !bad_dates.is_empty() {
            return Err(DepletionError::InvalidTimestamp { rows: bad_dates });
        }
        if !bad_hours.is_empty() {
            return Err(DepletionError::InvalidHour { rows: bad_hours });
        }

        Ok(timestamped)
    }
}

/// Normalize readings with the default normalizer, returning only the series.
pub fn normalize(readings: &[RawReading]) -> Result<HourlySeries> {
    SeriesNormalizer::new()
        .normalize(readings)
        .map(|normalized| normalized.series)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn first_day_after(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(1))
        .ok_or_else(|| DepletionError::TimestampError(format!("no day after {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_warnings;
    use approx::assert_relative_eq;
    use chrono::Timelike;

    fn reading(date: &str, hour: u32, quantity: f64) -> RawReading {
        RawReading::new(date, hour, "3300000002", 3, quantity)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    #[test]
    fn parses_supported_date_formats() {
        assert_eq!(parse_reading_date("2024-10-21"), Some(day(21)));
        assert_eq!(parse_reading_date("2024-10-21 00:00:00"), Some(day(21)));
        assert_eq!(parse_reading_date("2024-10-21T13:45:00"), Some(day(21)));
        assert_eq!(parse_reading_date(" 21.10.2024 "), Some(day(21)));
        assert_eq!(parse_reading_date("2024-13-01"), None);
        assert_eq!(parse_reading_date(""), None);
    }

    #[test]
    fn hour_24_rolls_over_to_next_day() {
        let ts = normalize_hour(day(21), 24).unwrap();
        assert_eq!(ts.date(), day(22));
        assert_eq!(ts.hour(), 0);

        // Month boundary.
        let ts = normalize_hour(day(31), 24).unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
    }

    #[test]
    fn hour_normalization_is_idempotent() {
        let once = normalize_hour(day(21), 24).unwrap();
        let twice = normalize_hour(once.date(), once.hour()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_hours_above_24() {
        assert!(normalize_hour(day(21), 25).is_none());
        let err = SeriesNormalizer::new()
            .normalize(&[reading("2024-10-21", 25, 1.0)])
            .unwrap_err();
        match err {
            DepletionError::InvalidHour { rows } => assert_eq!(rows, ["row 0: hour 25"]),
            other => panic!("expected InvalidHour, got {:?}", other),
        }
    }

    #[test]
    fn every_offending_row_is_reported() {
        let readings = vec![
            reading("2024-10-21", 30, 1.0),
            reading("not a date", 2, 1.0),
            reading("2024-10-21", 26, 1.0),
        ];
        match SeriesNormalizer::new().normalize(&readings) {
            Err(DepletionError::InvalidTimestamp { rows }) => {
                assert_eq!(rows, ["row 1: \"not a date\""]);
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }

        let readings = vec![
            reading("2024-10-21", 30, 1.0),
            reading("2024-10-21", 2, 1.0),
            reading("2024-10-21", 26, 1.0),
        ];
        match SeriesNormalizer::new().normalize(&readings) {
            Err(DepletionError::InvalidHour { rows }) => {
                assert_eq!(rows, ["row 0: hour 30", "row 2: hour 26"]);
            }
            other => panic!("expected InvalidHour, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = SeriesNormalizer::new().normalize(&[]).unwrap_err();
        assert!(matches!(err, DepletionError::EmptyInput));
    }

    #[test]
    fn bad_dates_fail_with_offending_rows() {
        let readings = vec![
            reading("2024-10-21", 1, 1.0),
            reading("not a date", 2, 1.0),
            reading("2024-10-21", 3, 1.0),
            reading("32.10.2024", 4, 1.0),
        ];
        match SeriesNormalizer::new().normalize(&readings) {
            Err(DepletionError::InvalidTimestamp { rows }) => {
                assert_eq!(rows.len(), 2);
                assert!(rows[0].starts_with("row 1"));
                assert!(rows[1].starts_with("row 3"));
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn covers_whole_days_through_following_midnight() {
        let readings = vec![reading("2024-10-21", 7, 5.0), reading("2024-10-21", 9, 7.0)];
        let normalized = SeriesNormalizer::new().normalize(&readings).unwrap();
        let series = &normalized.series;

        assert_eq!(series.start(), Some(midnight(day(21))));
        assert_eq!(series.end(), Some(midnight(day(22))));
        assert_eq!(series.len(), 25);
        assert_eq!(normalized.filled_hours, 23);
    }

    #[test]
    fn duplicates_are_summed() {
        let readings = vec![
            reading("2024-10-21", 5, 3.0),
            reading("2024-10-21 00:00:00", 5, 4.5),
            reading("2024-10-21", 6, 1.0),
        ];
        let normalized = SeriesNormalizer::new().normalize(&readings).unwrap();
        assert_eq!(normalized.merged_duplicates, 1);

        let at5 = day(21).and_hms_opt(5, 0, 0).unwrap();
        assert_relative_eq!(normalized.series.get(at5).unwrap().quantity(), 7.5);
    }

    #[test]
    fn hour_24_merges_with_next_day_midnight_reading() {
        let readings = vec![reading("2024-10-21", 24, 2.0), reading("2024-10-22", 0, 3.0)];
        let normalized = SeriesNormalizer::new().normalize(&readings).unwrap();
        let midnight_22 = midnight(day(22));
        assert_relative_eq!(normalized.series.get(midnight_22).unwrap().quantity(), 5.0);
        // Range starts at the first timestamp's day, which is the 22nd.
        assert_eq!(normalized.series.start(), Some(midnight_22));
    }

    #[test]
    fn filling_gaps_emits_a_warning() {
        let readings = vec![reading("2024-10-21", 10, 10.0), reading("2024-10-21", 12, 20.0)];
        let (normalized, logs) =
            capture_warnings(|| SeriesNormalizer::new().normalize(&readings).unwrap());

        assert_eq!(normalized.filled_hours, 23);
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("missing hourly quantities"), "{}", logs);
        assert!(logs.contains("missing=23"), "{}", logs);
    }

    #[test]
    fn single_missing_hour_is_interpolated() {
        let readings = vec![reading("2024-10-21", 10, 10.0), reading("2024-10-21", 12, 20.0)];
        let series = normalize(&readings).unwrap();
        let at11 = day(21).and_hms_opt(11, 0, 0).unwrap();
        assert_relative_eq!(series.get(at11).unwrap().quantity(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn leading_and_trailing_gaps_take_nearest_known_value() {
        let readings = vec![reading("2024-10-21", 10, 10.0), reading("2024-10-21", 12, 20.0)];
        let series = normalize(&readings).unwrap();

        assert_relative_eq!(series.first().unwrap().quantity(), 10.0);
        assert_relative_eq!(series.last().unwrap().quantity(), 20.0);
    }

    #[test]
    fn normalized_series_is_contiguous() {
        let readings = vec![
            reading("2024-10-23", 3, 1.0),
            reading("2024-10-21", 1, 2.0),
            reading("2024-10-22", 24, 3.0),
        ];
        let series = normalize(&readings).unwrap();
        for pair in series.samples().windows(2) {
            assert_eq!(pair[1].timestamp() - pair[0].timestamp(), Duration::hours(1));
        }
        assert_eq!(series.len(), 3 * 24 + 1);
    }
}
