//! Data transformations for consumption series.
//!
//! Provides reconstruction of complete hourly series from raw readings and
//! the window functions used by the estimators.
//!
//! # Example
//!
//! ```
//! use deadstock::core::RawReading;
//! use deadstock::transform::{normalize, trailing_mean};
//!
//! let readings = vec![
//!     RawReading::new("2024-10-21", 10, "3300000002", 3, 10.0),
//!     RawReading::new("2024-10-21", 12, "3300000002", 3, 20.0),
//! ];
//! let series = normalize(&readings).unwrap();
//! assert_eq!(series.len(), 25);
//!
//! // Hours after the last reading carry its value forward.
//! let tail = trailing_mean(&series.quantities(), 3).unwrap();
//! assert_eq!(tail, 20.0);
//! ```

pub mod normalize;
pub mod window;

pub use normalize::{normalize, normalize_hour, parse_reading_date, Normalized, SeriesNormalizer};
pub use window::{expanding_sum, trailing_mean};
