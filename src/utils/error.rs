use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database returned {status}: {message}")]
    DatabaseError { status: u16, message: String },

    #[error("Batch {batch} ({rows} rows) failed: {source}")]
    BatchWriteError {
        batch: usize,
        rows: usize,
        #[source]
        source: Box<EtlError>,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Database,
    Configuration,
    Data,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::DatabaseError { .. } => ErrorCategory::Database,
            EtlError::BatchWriteError { source, .. } => source.category(),
            EtlError::CsvError(_) => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) => format!("Could not read the source file: {}", e),
            EtlError::CsvError(e) => format!("The source file is not valid CSV: {}", e),
            EtlError::ApiError(e) => format!("Could not reach the database: {}", e),
            EtlError::DatabaseError { status, message } => {
                format!("The database rejected the request ({}): {}", status, message)
            }
            EtlError::BatchWriteError { batch, rows, .. } => {
                format!("Batch {} with {} rows was not inserted", batch, rows)
            }
            _ => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the source path exists and is readable",
            ErrorCategory::Network => "Check the database endpoint and your network connection",
            ErrorCategory::Database => {
                "Check the project, instance, database and table names and the access token"
            }
            ErrorCategory::Configuration => "Fix the configuration file and try again",
            ErrorCategory::Data => "Check that the source file is UTF-8 encoded CSV",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
