//! Error types for content extraction

use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur during content extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Nothing conforming to the schema survived sanitization
    #[cfg(feature = "schema")]
    #[error("No schema-conformant data could be recovered from the model output")]
    NoRecoverableData,

    /// Output passed the relaxed schema but failed the original one after URL repair
    #[cfg(feature = "schema")]
    #[error("Output failed validation after URL repair: {0}")]
    UrlValidation(#[from] hanzo_schema::ValidationError),

    /// Model output is not JSON
    #[error("Malformed model output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// Boilerplate pattern data could not be parsed
    #[error("Invalid boilerplate patterns: {0}")]
    InvalidPatterns(#[from] toml::de::Error),
}
