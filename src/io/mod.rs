//! Edges of the pipeline: reading sources and report output.

pub mod report;
pub mod source;

pub use report::{summary_lines, write_comparison, write_comparison_file};
pub use source::{CsvReadingSource, ReadingQuery, ReadingSource};
