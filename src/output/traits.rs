//! Output sink trait and errors
//!
//! Every sink receives the finished correlation and persists it in its own
//! format.

use crate::correlate::Correlation;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output sinks
pub trait OutputSink {
    /// Short name of the format, used in log messages
    fn name(&self) -> &'static str;

    /// Writes the features and products of a correlation
    ///
    /// # Arguments
    ///
    /// * `result` - The correlation to persist
    fn write(&self, result: &Correlation) -> OutputResult<()>;
}
