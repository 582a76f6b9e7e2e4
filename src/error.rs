//! Typed errors raised by the monitor and its HTTP surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Invalid saturation level '{0}', expected low, medium or high")]
    InvalidSaturation(String),

    #[error("Estimated minutes {0} out of range (1-1440)")]
    InvalidMinutes(i64),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("No file found in field 'csv_file'")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("File must be a CSV")]
    NotCsv,

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("CSV must contain columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid CSV row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    #[error("No historical data available")]
    NoData,

    #[error("Invalid route registry: {0}")]
    InvalidRegistry(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// True for errors caused by the request content rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MonitorError::Csv(_) | MonitorError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
