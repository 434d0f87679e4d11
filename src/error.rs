use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillReportError {
    #[error("Invalid period format: '{0}'. Expected YYYY-MM with month 01-12")]
    InvalidPeriodFormat(String),

    #[error("Invalid year {0}: must be between 0000 and 9999")]
    InvalidYear(i32),

    #[error("Invalid quarter '{0}': must be one of Q1, Q2, Q3, Q4")]
    InvalidQuarter(String),

    #[error("Unsupported label locale '{0}'")]
    InvalidLocale(String),

    #[error("Validation error for bill '{bill}': {details}")]
    ValidationError { bill: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BillReportError>;
