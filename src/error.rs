//! Error types for rulesql.

use thiserror::Error;

/// The main error type for rule configuration and lifecycle operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    /// Structured input did not have the expected shape.
    #[error("Deserialization error at {path}: {message}")]
    Deserialization { path: String, message: String },

    /// An AST invariant was violated (empty select, bad alias, operator arity...).
    #[error("Structural error: {0}")]
    Structural(String),

    /// A name was used without being declared.
    #[error("Referential error: {message}")]
    Referential {
        message: String,
        suggestion: Option<String>,
    },

    /// Illegal lifecycle move.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Cross-field business rule violated on the rule entity.
    #[error("Business invariant violated: {0}")]
    BusinessInvariant(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (settings and CLI file access only).
    #[error("IO error: {0}")]
    Io(String),
}

impl RuleError {
    /// Create a deserialization error at the given path.
    pub fn deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Deserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Create a referential error without a suggestion.
    pub fn referential(message: impl Into<String>) -> Self {
        Self::Referential {
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a referential error with a "did you mean" hint folded into the message.
    pub fn referential_with(message: impl Into<String>, suggestion: Option<String>) -> Self {
        let mut message = message.into();
        if let Some(s) = &suggestion {
            message.push_str(&format!(". Did you mean '{}'?", s));
        }
        Self::Referential {
            message,
            suggestion,
        }
    }

    /// Create a business invariant error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::BusinessInvariant(message.into())
    }

    /// Stable machine-readable code, for outer layers mapping errors to responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deserialization { .. } => "DESERIALIZATION_ERROR",
            Self::Structural(_) => "STRUCTURAL_ERROR",
            Self::Referential { .. } => "REFERENTIAL_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::BusinessInvariant(_) => "BUSINESS_INVARIANT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

impl From<std::io::Error> for RuleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type alias for rulesql operations.
pub type RuleResult<T> = Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuleError::deserialization("$.select.fields[0]", "missing key 'expression'");
        assert_eq!(
            err.to_string(),
            "Deserialization error at $.select.fields[0]: missing key 'expression'"
        );
    }

    #[test]
    fn test_referential_suggestion() {
        let err = RuleError::referential_with(
            "Parameter 'strat_date' is referenced but not declared",
            Some("start_date".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Referential error: Parameter 'strat_date' is referenced but not declared. Did you mean 'start_date'?"
        );
        assert_eq!(err.kind(), "REFERENTIAL_ERROR");
    }

    #[test]
    fn test_transition_display() {
        let err = RuleError::InvalidTransition {
            from: "DRAFT".to_string(),
            to: "IN_PRODUCTION".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid transition: DRAFT -> IN_PRODUCTION");
    }
}
