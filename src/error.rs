//! Error types for cfgtree
//!
//! Only construction-time and lookup problems are errors. A candidate that a
//! constraint rejects, or an assignment to a final value, is reported through
//! the `bool` returned by [`Value::set_value`](crate::Value::set_value).

use crate::constraint::CompositeType;
use crate::types::TypeTag;
use thiserror::Error;

/// Result type alias for cfgtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cfgtree
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Tree Construction Errors
    // -------------------------------------------------------------------------
    #[error("Node '{parent}' already has a child named '{name}'")]
    DuplicateName { parent: String, name: String },

    #[error("Item '{0}' is already attached to a parent node")]
    AlreadyAttached(String),

    // -------------------------------------------------------------------------
    // Constraint Construction Errors
    // -------------------------------------------------------------------------
    #[error("{kind} composite cannot hold {found} children")]
    InvalidArity { kind: CompositeType, found: usize },

    #[error("Constraint '{constraint}' cannot apply to a value of type {value_type}")]
    IncompatibleConstraint {
        constraint: &'static str,
        value_type: TypeTag,
    },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Type mismatch for {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to decode value: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ItemNotFound(_))
    }

    /// Check if this error was raised while assembling a tree or a constraint
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName { .. }
                | Error::AlreadyAttached(_)
                | Error::InvalidArity { .. }
                | Error::IncompatibleConstraint { .. }
                | Error::InvalidPattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = Error::ItemNotFound("network.port".into());
        assert!(err.is_not_found());
        assert!(!err.is_build_error());

        let err = Error::InvalidArity {
            kind: CompositeType::Invert,
            found: 2,
        };
        assert!(err.is_build_error());
        assert_eq!(err.to_string(), "INVERT composite cannot hold 2 children");
    }

    #[test]
    fn test_incompatible_constraint_message() {
        let err = Error::IncompatibleConstraint {
            constraint: "min_length",
            value_type: TypeTag::Integer,
        };
        assert_eq!(
            err.to_string(),
            "Constraint 'min_length' cannot apply to a value of type integer"
        );
    }
}
