use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Reading for this customer, type and month already reported")]
    DoubleReport,

    #[error("Reading not found: {0}")]
    MeasureNotFound(String),

    #[error("Reading has already been confirmed")]
    ConfirmationDuplicate,

    #[error("Invalid measure type: {0}")]
    InvalidType(String),

    #[error("No readings found")]
    MeasuresNotFound,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
