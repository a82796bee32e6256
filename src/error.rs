//! Error types for the deadstock library.

use thiserror::Error;

/// Result type alias for depletion forecasting operations.
pub type Result<T> = std::result::Result<T, DepletionError>;

/// Broad classes of failure, used by callers to decide how to report an abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad user input or an empty result from the data source.
    Input,
    /// Source rows that cannot be turned into a valid hourly series.
    DataQuality,
    /// Numerical or invariant failures inside the forecasting core.
    Computation,
    /// Filesystem, CSV or configuration problems at the edges.
    Io,
}

impl ErrorCategory {
    /// Process exit status for an abort in this category.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Input => 2,
            Self::DataQuality => 3,
            Self::Computation => 4,
            Self::Io => 5,
        }
    }
}

/// Errors that can occur while building, forecasting or simulating a series.
#[derive(Error, Debug)]
pub enum DepletionError {
    /// The data source returned no rows.
    #[error("empty input data")]
    EmptyInput,

    /// Fuel name outside the closed set of known fuels.
    #[error("unknown fuel type: {0}")]
    UnknownFuel(String),

    /// One or more source dates could not be parsed.
    #[error("unparsable dates in {} row(s): {}", rows.len(), rows.join("; "))]
    InvalidTimestamp { rows: Vec<String> },

    /// Hour-of-day outside 0..=24 in one or more rows.
    #[error("invalid hours in {} row(s): {}", rows.len(), rows.join("; "))]
    InvalidHour { rows: Vec<String> },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values left where a complete series is required.
    #[error("{0} missing value(s) in series")]
    MissingValues(usize),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DepletionError {
    /// Classify the error for reporting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput | Self::UnknownFuel(_) => ErrorCategory::Input,
            Self::InvalidTimestamp { .. } | Self::InvalidHour { .. } => ErrorCategory::DataQuality,
            Self::InsufficientData { .. }
            | Self::InvalidParameter(_)
            | Self::DimensionMismatch { .. }
            | Self::TimestampError(_)
            | Self::MissingValues(_)
            | Self::ComputationError(_) => ErrorCategory::Computation,
            Self::Io(_) | Self::Csv(_) | Self::Config(_) => ErrorCategory::Io,
        }
    }
}

impl From<toml::de::Error> for DepletionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
