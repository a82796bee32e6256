//! Where raw readings come from.

use crate::core::RawReading;
use crate::error::Result;
use crate::fuel::FuelType;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Selects the readings of one tank at one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingQuery {
    pub station: String,
    pub fuel: FuelType,
    pub tank: u32,
}

impl ReadingQuery {
    pub fn new(station: impl Into<String>, fuel: FuelType, tank: u32) -> Self {
        Self {
            station: station.into(),
            fuel,
            tank,
        }
    }

    fn matches(&self, station: Option<&str>, fuel: &str, tank: u32) -> bool {
        let station_ok = station.map_or(true, |s| s.trim() == self.station);
        station_ok && fuel.trim() == self.fuel.id() && tank == self.tank
    }
}

/// A provider of hourly consumption rows.
pub trait ReadingSource {
    fn fetch(&self, query: &ReadingQuery) -> Result<Vec<RawReading>>;
}

/// In-memory rows, filtered by fuel and tank.
impl ReadingSource for Vec<RawReading> {
    fn fetch(&self, query: &ReadingQuery) -> Result<Vec<RawReading>> {
        Ok(self
            .iter()
            .filter(|r| query.matches(None, &r.fuel, r.tank))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    station: Option<String>,
    date: String,
    hour: u32,
    fuel: String,
    tank: u32,
    quantity: Option<f64>,
}

/// Readings exported to CSV with columns `date,hour,fuel,tank,quantity`
/// and an optional `station` column.
///
/// An empty quantity cell counts as zero consumption.
#[derive(Debug, Clone)]
pub struct CsvReadingSource {
    path: PathBuf,
}

impl CsvReadingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSource for CsvReadingSource {
    fn fetch(&self, query: &ReadingQuery) -> Result<Vec<RawReading>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut readings = Vec::new();
        let mut total = 0usize;
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            total += 1;
            if !query.matches(row.station.as_deref(), &row.fuel, row.tank) {
                continue;
            }
            readings.push(RawReading {
                date: row.date,
                hour: row.hour,
                fuel: row.fuel,
                tank: row.tank,
                quantity: row.quantity.unwrap_or(0.0),
            });
        }

        debug!(path = %self.path.display(), total, "read source rows");
        info!(
            station = %query.station,
            fuel = %query.fuel,
            tank = query.tank,
            rows = readings.len(),
            "fetched readings"
        );
        Ok(readings)
    }
}
