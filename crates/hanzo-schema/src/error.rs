//! Error types for Hanzo Schema

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema error types
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A value did not satisfy a schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A JSON Schema document could not be used
    #[error("Invalid JSON Schema: {0}")]
    InvalidJsonSchema(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A single failed check, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value ("" for the root)
    pub path: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue found while validating one value
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Value does not match schema: {}", join_issues(.issues))]
pub struct ValidationError {
    /// Issues in traversal order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// True when some issue sits at or below `path`
    pub fn touches(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path.starts_with(path))
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            issues: vec![
                ValidationIssue {
                    path: String::new(),
                    message: "expected object".to_string(),
                },
                ValidationIssue {
                    path: "/links/0".to_string(),
                    message: "invalid url".to_string(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "Value does not match schema: (root): expected object; /links/0: invalid url"
        );
        assert!(err.touches("/links"));
        assert!(!err.touches("/name"));
    }
}
