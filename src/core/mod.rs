//! Core data structures for hourly consumption forecasting.

mod forecast;
mod reading;
mod series;

pub use forecast::{DepletionPoint, ForecastPoint, ForecastValue, PointOrigin};
pub use reading::RawReading;
pub use series::{is_on_hour, weekday_of, HourlyGrid, HourlySeries, Sample};
