//! Typed per-record problems.
//!
//! None of these abort a batch. Drivers collect them into their reports and
//! decide the process outcome once every record has been seen.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The frontmatter could not be read as a mapping at all.
    #[error("Failed to parse: {0}")]
    ParseFailure(String),

    #[error("Invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{field} date is in the future")]
    FutureTimestamp { field: String },

    #[error("{message}")]
    SchemaViolation { field: String, message: String },
}

impl CoreError {
    /// Frontmatter field the error points at, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::ParseFailure(_) => None,
            CoreError::InvalidUrl { .. } => Some("url"),
            CoreError::FutureTimestamp { field } => Some(field),
            CoreError::SchemaViolation { field, .. } => Some(field),
        }
    }

    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::SchemaViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_points_at_offending_key() {
        let err = CoreError::FutureTimestamp {
            field: "capturedAt".to_string(),
        };
        assert_eq!(err.field(), Some("capturedAt"));
        assert_eq!(err.to_string(), "capturedAt date is in the future");

        let err = CoreError::ParseFailure("bad indentation".to_string());
        assert_eq!(err.field(), None);
    }
}
