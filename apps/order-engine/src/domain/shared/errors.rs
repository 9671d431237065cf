//! Shared domain errors.

use thiserror::Error;

/// Errors raised by value objects and aggregate invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A value failed validation.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// An aggregate invariant was violated.
    #[error("Invariant violation in {aggregate}: {invariant} (state: {state})")]
    InvariantViolation {
        /// Aggregate where the violation occurred.
        aggregate: String,
        /// Invariant description.
        invariant: String,
        /// Current state values.
        state: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = DomainError::InvalidValue {
            field: "quantity".to_string(),
            message: "must be positive".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("quantity"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn invariant_violation_display() {
        let err = DomainError::InvariantViolation {
            aggregate: "FillState".to_string(),
            invariant: "filled <= quantity".to_string(),
            state: "filled=12, quantity=10".to_string(),
        };
        assert!(format!("{err}").contains("FillState"));
    }
}
