//! Restricted condition expressions for strategy rules.
//!
//! Strategy buy/sell conditions are never executed as general-purpose
//! code. They are written in a closed expression language (comparisons
//! and boolean connectives over named numeric inputs), parsed into a
//! tagged-variant AST and evaluated by a dedicated interpreter against an
//! explicit input context.
//!
//! Grammar:
//!
//! ```text
//! expr       := or
//! or         := and ("or" and)*
//! and        := unary ("and" unary)*
//! unary      := "not" unary | "(" expr ")" | comparison
//! comparison := operand ("<" | "<=" | ">" | ">=" | "==" | "!=") operand
//! operand    := number | identifier
//! ```

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from parsing or evaluating a condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The source contains a character outside the language.
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter {
        /// Offending character.
        found: char,
        /// Byte position in the source.
        position: usize,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("Unexpected token '{found}'")]
    UnexpectedToken {
        /// Offending token text.
        found: String,
    },

    /// The source ended mid-expression.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// A numeric literal does not parse as a decimal.
    #[error("Invalid number literal: {literal}")]
    InvalidNumber {
        /// Offending literal.
        literal: String,
    },

    /// Evaluation referenced an input the context does not provide.
    #[error("Unknown input: {name}")]
    UnknownInput {
        /// The missing input name.
        name: String,
    },
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CmpOp {
    fn apply(self, lhs: Decimal, rhs: Decimal) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        };
        write!(f, "{symbol}")
    }
}

/// A numeric operand: a literal or a named input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Literal decimal value.
    Number(Decimal),
    /// Named input resolved from the evaluation context.
    Input(String),
}

impl Operand {
    fn resolve(&self, inputs: &HashMap<String, Decimal>) -> Result<Decimal, ExprError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Input(name) => {
                inputs
                    .get(name)
                    .copied()
                    .ok_or_else(|| ExprError::UnknownInput { name: name.clone() })
            }
        }
    }
}

/// A parsed condition over named numeric inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A single comparison.
    Compare {
        /// Comparison operator.
        op: CmpOp,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// True when every sub-condition is true.
    All(Vec<Condition>),
    /// True when any sub-condition is true.
    Any(Vec<Condition>),
    /// Logical negation.
    Not(Box<Condition>),
}

impl Condition {
    /// Parse a condition from source text.
    ///
    /// # Errors
    ///
    /// Returns `ExprError` on malformed source. Parsing never executes
    /// anything.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let condition = parser.parse_or()?;
        match parser.peek() {
            None => Ok(condition),
            Some(token) => Err(ExprError::UnexpectedToken {
                found: token.text(),
            }),
        }
    }

    /// Evaluate the condition against an explicit input context.
    ///
    /// # Errors
    ///
    /// Returns `ExprError::UnknownInput` if the condition references an
    /// input the context does not provide.
    pub fn evaluate(&self, inputs: &HashMap<String, Decimal>) -> Result<bool, ExprError> {
        match self {
            Self::Compare { op, lhs, rhs } => {
                Ok(op.apply(lhs.resolve(inputs)?, rhs.resolve(inputs)?))
            }
            Self::All(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(inputs)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any(conditions) => {
                for condition in conditions {
                    if condition.evaluate(inputs)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(inner) => Ok(!inner.evaluate(inputs)?),
        }
    }

    /// Names of all inputs the condition references.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_inputs(&mut names);
        names.sort_unstable();
        names.dedup();
        names
    }

    fn collect_inputs<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Compare { lhs, rhs, .. } => {
                for operand in [lhs, rhs] {
                    if let Operand::Input(name) = operand {
                        names.push(name);
                    }
                }
            }
            Self::All(conditions) | Self::Any(conditions) => {
                for condition in conditions {
                    condition.collect_inputs(names);
                }
            }
            Self::Not(inner) => inner.collect_inputs(names),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Cmp(CmpOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Token {
    fn text(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Ident(name) => name.clone(),
            Self::Cmp(op) => op.to_string(),
            Self::And => "and".to_string(),
            Self::Or => "or".to_string(),
            Self::Not => "not".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '<' | '>' | '=' | '!' => {
                let two = bytes.get(i + 1).is_some_and(|b| *b == b'=');
                let op = match (c, two) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    ('>', true) => CmpOp::Ge,
                    ('=', true) => CmpOp::Eq,
                    ('!', true) => CmpOp::Ne,
                    _ => {
                        return Err(ExprError::UnexpectedCharacter {
                            found: c,
                            position: i,
                        });
                    }
                };
                i += if two { 2 } else { 1 };
                tokens.push(Token::Cmp(op));
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &source[start..i];
                let value = literal.parse().map_err(|_| ExprError::InvalidNumber {
                    literal: literal.to_string(),
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric()
                        || bytes[i] == b'_'
                        || bytes[i] == b'.')
                {
                    i += 1;
                }
                let word = &source[start..i];
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word.to_string()),
                });
            }
            _ => {
                return Err(ExprError::UnexpectedCharacter {
                    found: c,
                    position: i,
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Condition, ExprError> {
        let mut branches = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            branches.push(self.parse_and()?);
        }
        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(Condition::Any(branches))
        }
    }

    fn parse_and(&mut self) -> Result<Condition, ExprError> {
        let mut branches = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            branches.push(self.parse_unary()?);
        }
        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(Condition::All(branches))
        }
    }

    fn parse_unary(&mut self) -> Result<Condition, ExprError> {
        match self.peek() {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(Condition::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(ExprError::UnexpectedToken {
                        found: token.text(),
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_comparison(&mut self) -> Result<Condition, ExprError> {
        let lhs = self.parse_operand()?;
        let op = match self.bump() {
            Some(Token::Cmp(op)) => op,
            Some(token) => {
                return Err(ExprError::UnexpectedToken {
                    found: token.text(),
                });
            }
            None => return Err(ExprError::UnexpectedEnd),
        };
        let rhs = self.parse_operand()?;
        Ok(Condition::Compare { op, lhs, rhs })
    }

    fn parse_operand(&mut self) -> Result<Operand, ExprError> {
        match self.bump() {
            Some(Token::Number(value)) => Ok(Operand::Number(value)),
            Some(Token::Ident(name)) => Ok(Operand::Input(name)),
            Some(token) => Err(ExprError::UnexpectedToken {
                found: token.text(),
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(pairs: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), *value))
            .collect()
    }

    #[test]
    fn parses_single_comparison() {
        let condition = Condition::parse("rsi < 30").unwrap();
        assert_eq!(
            condition,
            Condition::Compare {
                op: CmpOp::Lt,
                lhs: Operand::Input("rsi".to_string()),
                rhs: Operand::Number(dec!(30)),
            }
        );
    }

    #[test]
    fn evaluates_all_comparison_operators() {
        let ctx = inputs(&[("x", dec!(10))]);

        for (source, expected) in [
            ("x < 11", true),
            ("x <= 10", true),
            ("x > 10", false),
            ("x >= 10", true),
            ("x == 10", true),
            ("x != 10", false),
        ] {
            let condition = Condition::parse(source).unwrap();
            assert_eq!(condition.evaluate(&ctx).unwrap(), expected, "{source}");
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // Parsed as (a > 1 and b > 1) or c > 1
        let condition = Condition::parse("a > 1 and b > 1 or c > 1").unwrap();
        let ctx = inputs(&[("a", dec!(0)), ("b", dec!(0)), ("c", dec!(2))]);
        assert!(condition.evaluate(&ctx).unwrap());

        let ctx = inputs(&[("a", dec!(2)), ("b", dec!(0)), ("c", dec!(0))]);
        assert!(!condition.evaluate(&ctx).unwrap());
    }

    #[test]
    fn parentheses_override_precedence() {
        let condition = Condition::parse("a > 1 and (b > 1 or c > 1)").unwrap();
        let ctx = inputs(&[("a", dec!(2)), ("b", dec!(0)), ("c", dec!(2))]);
        assert!(condition.evaluate(&ctx).unwrap());

        let ctx = inputs(&[("a", dec!(0)), ("b", dec!(2)), ("c", dec!(2))]);
        assert!(!condition.evaluate(&ctx).unwrap());
    }

    #[test]
    fn not_negates() {
        let condition = Condition::parse("not rsi < 30").unwrap();
        assert!(condition.evaluate(&inputs(&[("rsi", dec!(50))])).unwrap());
        assert!(!condition.evaluate(&inputs(&[("rsi", dec!(20))])).unwrap());
    }

    #[test]
    fn dotted_input_names() {
        let condition = Condition::parse("macd.signal >= 0.5").unwrap();
        assert!(
            condition
                .evaluate(&inputs(&[("macd.signal", dec!(0.75))]))
                .unwrap()
        );
    }

    #[test]
    fn unknown_input_is_a_typed_error() {
        let condition = Condition::parse("rsi < 30").unwrap();
        let err = condition.evaluate(&HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            ExprError::UnknownInput {
                name: "rsi".to_string()
            }
        );
    }

    #[test]
    fn malformed_sources_are_rejected() {
        assert!(Condition::parse("").is_err());
        assert!(Condition::parse("rsi <").is_err());
        assert!(Condition::parse("rsi 30").is_err());
        assert!(Condition::parse("(rsi < 30").is_err());
        assert!(Condition::parse("rsi < 30 extra").is_err());
        assert!(Condition::parse("rsi # 30").is_err());
        assert!(Condition::parse("rsi = 30").is_err());
        assert!(Condition::parse("1.2.3 < 4").is_err());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let condition = Condition::parse("rsi < 30 AND volume > 1000").unwrap();
        let ctx = inputs(&[("rsi", dec!(25)), ("volume", dec!(5000))]);
        assert!(condition.evaluate(&ctx).unwrap());
    }

    #[test]
    fn input_names_are_collected() {
        let condition = Condition::parse("rsi < 30 and (volume > 1000 or rsi > 70)").unwrap();
        assert_eq!(condition.input_names(), vec!["rsi", "volume"]);
    }

    #[test]
    fn number_on_both_sides() {
        let condition = Condition::parse("1 < 2").unwrap();
        assert!(condition.evaluate(&HashMap::new()).unwrap());
    }
}
