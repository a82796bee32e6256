//! Numerical and evaluation utilities.

pub mod metrics;
pub mod ridge;

pub use metrics::{ratio_accuracy, AccuracyEvaluator, AccuracyRecord, AccuracyReport};
pub use ridge::{predict_row, ridge_fit};
