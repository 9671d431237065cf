//! Symbol value object for instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// A trading symbol as entered by callers, e.g. "AAPL" or "BTC-USD".
///
/// Normalized to uppercase. Resolution against the instrument catalog turns
/// a symbol into an `InstrumentId`; a symbol on its own is just a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate the symbol for use in an order request.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, too long, or contains
    /// characters outside `[A-Z0-9.-]`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol cannot be empty".to_string(),
            });
        }
        if self.0.len() > 21 {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: format!("Symbol too long: {} chars", self.0.len()),
            });
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: format!("Symbol contains invalid characters: {}", self.0),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes_to_uppercase() {
        assert_eq!(Symbol::new("aapl").as_str(), "AAPL");
    }

    #[test]
    fn symbol_validate_accepts_ticker() {
        assert!(Symbol::new("AAPL").validate().is_ok());
        assert!(Symbol::new("BRK.B").validate().is_ok());
        assert!(Symbol::new("BTC-USD").validate().is_ok());
    }

    #[test]
    fn symbol_validate_rejects_empty() {
        assert!(Symbol::new("").validate().is_err());
    }

    #[test]
    fn symbol_validate_rejects_too_long() {
        assert!(Symbol::new("A".repeat(22)).validate().is_err());
    }

    #[test]
    fn symbol_validate_rejects_invalid_chars() {
        assert!(Symbol::new("AA PL").validate().is_err());
        assert!(Symbol::new("AAPL!").validate().is_err());
    }

    #[test]
    fn symbol_display() {
        assert_eq!(format!("{}", Symbol::new("msft")), "MSFT");
    }
}
