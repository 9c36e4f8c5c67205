//! Error types for the estimator

use thiserror::Error;

/// Result type alias for the estimator
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Main error type for the estimator
#[derive(Error, Debug)]
pub enum EstimatorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required-field and type check failures on incoming requests
    #[error("Validation error: {0}")]
    Validation(String),

    /// Spreadsheet or generated-text parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// The regional cost table is structurally unusable
    #[error("{0}")]
    RegionalData(String),

    /// Text-generation endpoint failures
    #[error("Generation error: {0}")]
    Generation(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl EstimatorError {
    /// Whether the error is reported to callers as a client mistake (400)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Parsing(_))
    }
}
