//! Error types for the modelforge library.

use thiserror::Error;

use crate::session::BuildStage;

/// Main error type for modelforge operations.
#[derive(Debug, Error)]
pub enum ModelForgeError {
    /// Malformed structural input rejected at the boundary.
    #[error("Validation error{}: {message}", context_suffix(.table, .field))]
    Validation {
        message: String,
        table: Option<String>,
        field: Option<String>,
    },

    /// Input contained no tables at all (distinguished so callers can
    /// suggest "no tables found" instead of a generic validation failure).
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Stage build invoked with an incomplete context or unknown stage.
    #[error("Build context error for stage {stage}: {message}")]
    BuildContext { stage: BuildStage, message: String },

    /// No active session, or session id not found.
    #[error("Session error: {0}")]
    Session(String),

    /// Operation invoked out of the required order.
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// Invalid build configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error saving or loading session records.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelForgeError {
    /// Build a validation error with no table/field context.
    pub fn validation(message: impl Into<String>) -> Self {
        ModelForgeError::Validation {
            message: message.into(),
            table: None,
            field: None,
        }
    }

    /// Build a validation error scoped to a table.
    pub fn validation_in_table(message: impl Into<String>, table: impl Into<String>) -> Self {
        ModelForgeError::Validation {
            message: message.into(),
            table: Some(table.into()),
            field: None,
        }
    }

    /// Build a validation error scoped to a field within a table.
    pub fn validation_in_field(
        message: impl Into<String>,
        table: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        ModelForgeError::Validation {
            message: message.into(),
            table: Some(table.into()),
            field: Some(field.into()),
        }
    }
}

fn context_suffix(table: &Option<String>, field: &Option<String>) -> String {
    match (table, field) {
        (Some(t), Some(f)) => format!(" in {}.{}", t, f),
        (Some(t), None) => format!(" in table '{}'", t),
        _ => String::new(),
    }
}

/// Result type alias for modelforge operations.
pub type Result<T> = std::result::Result<T, ModelForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_context() {
        let err = ModelForgeError::validation_in_field("missing name", "Orders", "qty");
        assert_eq!(
            err.to_string(),
            "Validation error in Orders.qty: missing name"
        );

        let err = ModelForgeError::validation("bad input");
        assert_eq!(err.to_string(), "Validation error: bad input");
    }

    #[test]
    fn test_empty_input_is_distinct() {
        let err = ModelForgeError::EmptyInput("no tables found".to_string());
        assert!(matches!(err, ModelForgeError::EmptyInput(_)));
    }
}
