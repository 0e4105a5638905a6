use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// The operation is not available in the current phase; the UI disables the control.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// A required value is empty or malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// An async result arrived after its owning step or screen was left.
    #[error("Stale resolution: {0}")]
    StaleResolution(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
    #[error("Approval error: {0}")]
    ApprovalError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
