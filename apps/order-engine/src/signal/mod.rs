//! Strategy-signal boundary: restricted condition expressions.
//!
//! The strategy engine itself is an external collaborator; what crosses
//! the boundary is a rule: a side plus a parsed condition over named
//! indicator inputs, which callers evaluate against explicit context
//! before building an order request.

mod expr;

pub use expr::{CmpOp, Condition, ExprError, Operand};

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::order::OrderSide;

/// A strategy rule: the side to take when its condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRule {
    /// Rule name, for logging and audit.
    pub name: String,
    /// Side the rule suggests when triggered.
    pub side: OrderSide,
    /// Parsed trigger condition.
    pub condition: Condition,
}

impl SignalRule {
    /// Parse a rule from condition source text.
    ///
    /// # Errors
    ///
    /// Returns `ExprError` on malformed source.
    pub fn parse(
        name: impl Into<String>,
        side: OrderSide,
        source: &str,
    ) -> Result<Self, ExprError> {
        Ok(Self {
            name: name.into(),
            side,
            condition: Condition::parse(source)?,
        })
    }

    /// Evaluate the rule against explicit indicator inputs.
    ///
    /// # Errors
    ///
    /// Returns `ExprError::UnknownInput` if the context is missing an
    /// input the condition references.
    pub fn triggered(&self, inputs: &HashMap<String, Decimal>) -> Result<bool, ExprError> {
        self.condition.evaluate(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rule_parses_and_triggers() {
        let rule = SignalRule::parse("oversold-entry", OrderSide::Buy, "rsi < 30").unwrap();

        let mut inputs = HashMap::new();
        inputs.insert("rsi".to_string(), dec!(25));

        assert!(rule.triggered(&inputs).unwrap());
        assert_eq!(rule.side, OrderSide::Buy);

        inputs.insert("rsi".to_string(), dec!(55));
        assert!(!rule.triggered(&inputs).unwrap());
    }

    #[test]
    fn rule_rejects_malformed_source() {
        assert!(SignalRule::parse("bad", OrderSide::Sell, "rsi <<< 30").is_err());
    }
}
