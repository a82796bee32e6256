//! Comparison CSV and console summary.

use crate::error::Result;
use crate::simulation::{DepletionOutcome, SimulationStatus};
use crate::utils::{AccuracyRecord, AccuracyReport};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct ComparisonRow {
    timestamp: String,
    forecast: f64,
    actual: Option<f64>,
    accuracy: Option<f64>,
}

impl From<&AccuracyRecord> for ComparisonRow {
    fn from(record: &AccuracyRecord) -> Self {
        Self {
            timestamp: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            forecast: record.forecast,
            actual: record.actual,
            accuracy: record.accuracy,
        }
    }
}

/// Write `timestamp,forecast,actual,accuracy` rows; undefined cells are empty.
pub fn write_comparison<W: Write>(writer: W, records: &[AccuracyRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(ComparisonRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_comparison_file(path: impl AsRef<Path>, records: &[AccuracyRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_comparison(file, records)
}

/// Human-readable run summary.
pub fn summary_lines(outcome: &DepletionOutcome, accuracy: &AccuracyReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);

    match (outcome.crossing, outcome.crossing_time(), outcome.status) {
        (Some(point), Some(at), _) => lines.push(format!(
            "Dead stock reached at {} (level {:.1} after {} hour(s) of consumption)",
            at.format("%Y-%m-%d %H:%M"),
            point.remaining_level,
            point.hours_consumed
        )),
        (_, _, SimulationStatus::CapReached) => lines.push(format!(
            "Dead stock not reached within {} extension hour(s), level {:.1}",
            outcome.extension_steps,
            outcome.final_level().unwrap_or(f64::NAN)
        )),
        _ => lines.push("Dead stock reached before the forecast start".to_string()),
    }

    match accuracy.window_average {
        Some(avg) => lines.push(format!(
            "Mean accuracy: {:.2} % over {} hour(s)",
            avg, accuracy.contributing
        )),
        None => lines.push("Mean accuracy: undefined (no actual data in window)".to_string()),
    }

    if let (Some(mae), Some(rmse)) = (accuracy.mae, accuracy.rmse) {
        lines.push(format!("MAE: {:.2}, RMSE: {:.2}", mae, rmse));
    }

    lines
}
