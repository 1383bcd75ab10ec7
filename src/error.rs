use thiserror::Error;

pub type RatescopeResult<T> = Result<T, RatescopeError>;

#[derive(Debug, Error)]
pub enum RatescopeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid pipeline configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse pipeline configuration")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to dataset loading, validation, selections and frame operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// The dataset is malformed: one or more required columns are absent.
    #[error("Malformed input: missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Malformed input: column '{column}' could not be coerced: {msg}")]
    ColumnType { column: String, msg: String },

    #[error("Invalid party size: '{0}' (expected a positive integer)")]
    InvalidPartySize(String),

    #[error("Invalid hotel name: '{0}'")]
    InvalidHotelName(String),

    #[error("Data frame error: {0}")]
    DataFrame(String),
}

/// Errors related to file I/O and serialization.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Failed to create reader: {0}")]
    ReaderCreation(String),
}
