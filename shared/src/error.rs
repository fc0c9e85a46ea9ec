//! Error types for the scoring core

use thiserror::Error;

/// Errors raised while validating or aggregating an evaluation
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Bad input shape or range. `field` names the offending input.
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// A validation failure: the coffee name is already used in the owner's scope
    #[error("Validation error on coffee_name: '{0}' already exists")]
    DuplicateName(String),

    /// Invariant violated while aggregating otherwise valid input
    #[error("Computation error on {field}: {message}")]
    Computation { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ScoringError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn computation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ScoringError::Computation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Qualify the offending field with its position, e.g. `cups[2].aroma`
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            ScoringError::Validation { field, message } => ScoringError::Validation {
                field: format!("{}.{}", prefix, field),
                message,
            },
            ScoringError::Computation { field, message } => ScoringError::Computation {
                field: format!("{}.{}", prefix, field),
                message,
            },
            other => other,
        }
    }

    /// Name of the offending field, if the error carries one
    pub fn field(&self) -> Option<&str> {
        match self {
            ScoringError::Validation { field, .. } | ScoringError::Computation { field, .. } => {
                Some(field)
            }
            ScoringError::DuplicateName(_) => Some("coffee_name"),
            ScoringError::Serialization(_) => None,
        }
    }

    /// Whether the error rejects caller input (as opposed to a mid-aggregation failure)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScoringError::Validation { .. } | ScoringError::DuplicateName(_)
        )
    }
}

/// Result type alias for the scoring core
pub type ScoringResult<T> = Result<T, ScoringError>;
