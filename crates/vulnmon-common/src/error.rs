//! Error types shared across VulnMon crates

use thiserror::Error;

/// Result type alias for shared VulnMon operations
pub type Result<T> = std::result::Result<T, VulnmonError>;

/// Error type for code living in the common crate
#[derive(Error, Debug)]
pub enum VulnmonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl VulnmonError {
    /// Create an invalid value error for a named setting
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
