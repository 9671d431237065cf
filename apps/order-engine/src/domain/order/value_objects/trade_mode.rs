//! Trade mode (simulated vs real-money execution).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which venue account an order targets.
///
/// Immutable after creation; a simulated order can never become a
/// real-money order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeMode {
    /// Practice account, no money moves.
    Simulated,
    /// Real-money account.
    Live,
}

impl TradeMode {
    /// Returns true for real-money execution.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "SIMULATED"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_mode_is_live() {
        assert!(TradeMode::Live.is_live());
        assert!(!TradeMode::Simulated.is_live());
    }

    #[test]
    fn trade_mode_serde() {
        let json = serde_json::to_string(&TradeMode::Simulated).unwrap();
        assert_eq!(json, "\"SIMULATED\"");
    }
}
