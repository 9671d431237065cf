//! Cancellation and rejection reasons, plus data-integrity anomalies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an order was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CancelReason(String);

impl CancelReason {
    /// Annotation used when reconciliation finds no venue record.
    pub const RECONCILED_MISSING: &'static str = "reconciled-missing";

    /// Create a custom cancel reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// The caller asked for the cancel.
    #[must_use]
    pub fn user_requested() -> Self {
        Self("user-requested".to_string())
    }

    /// Reconciliation found the venue no longer knows the order.
    #[must_use]
    pub fn reconciled_missing() -> Self {
        Self(Self::RECONCILED_MISSING.to_string())
    }

    /// Get the reason string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an order was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectReason(String);

impl RejectReason {
    /// Create a custom reject reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// The venue reported the rejection during reconciliation.
    #[must_use]
    pub fn reconciled() -> Self {
        Self("reconciled-rejected".to_string())
    }

    /// Get the reason string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data-integrity red flag recorded against an order.
///
/// An anomalous order is frozen from further automatic mutation and
/// requires manual review; anomalies are never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Anomaly {
    /// An execution event would have pushed filled quantity past the
    /// order quantity; the excess was clamped.
    Overfill,
    /// Reconciliation found state it cannot explain (e.g. SUBMITTED with
    /// no venue order id).
    Reconciliation,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overfill => write!(f, "OVERFILL"),
            Self::Reconciliation => write!(f, "RECONCILIATION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reason_constructors() {
        assert_eq!(CancelReason::user_requested().as_str(), "user-requested");
        assert_eq!(
            CancelReason::reconciled_missing().as_str(),
            "reconciled-missing"
        );
        assert_eq!(CancelReason::new("timeout").as_str(), "timeout");
    }

    #[test]
    fn reject_reason_display() {
        let reason = RejectReason::new("insufficient buying power");
        assert_eq!(format!("{reason}"), "insufficient buying power");
    }

    #[test]
    fn anomaly_display() {
        assert_eq!(format!("{}", Anomaly::Overfill), "OVERFILL");
        assert_eq!(format!("{}", Anomaly::Reconciliation), "RECONCILIATION");
    }

    #[test]
    fn anomaly_serde() {
        let json = serde_json::to_string(&Anomaly::Overfill).unwrap();
        assert_eq!(json, "\"OVERFILL\"");
    }
}
