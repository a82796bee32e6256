//! Raw rows as delivered by the consumption source.

use serde::{Deserialize, Serialize};

/// One row of the hourly consumption table.
///
/// `hour` follows the source convention of 1..=24, where 24 means midnight
/// of the following day; 0 is accepted as well. `date` is kept as text
/// because parsing it is part of normalization and a failure there is a
/// reportable data-quality error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub date: String,
    pub hour: u32,
    pub fuel: String,
    pub tank: u32,
    pub quantity: f64,
}

impl RawReading {
    pub fn new(
        date: impl Into<String>,
        hour: u32,
        fuel: impl Into<String>,
        tank: u32,
        quantity: f64,
    ) -> Self {
        Self {
            date: date.into(),
            hour,
            fuel: fuel.into(),
            tank,
            quantity,
        }
    }
}
