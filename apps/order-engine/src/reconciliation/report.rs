//! Reconciliation pass results.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{OrderId, Timestamp, VenueOrderId};

/// What kind of correction a pass applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionKind {
    /// Missing fill deltas were applied from the venue's record.
    FilledFromVenue,
    /// The venue no longer has the order; local moved to CANCELLED.
    CancelledMissing,
    /// The venue reports the order cancelled; local moved to CANCELLED.
    CancelledFromVenue,
    /// The venue reports the order rejected; local moved to REJECTED.
    RejectedFromVenue,
}

/// One corrective transition applied by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// The corrected order.
    pub order_id: OrderId,
    /// Its venue order id, when known.
    pub venue_order_id: Option<VenueOrderId>,
    /// What was corrected.
    pub kind: CorrectionKind,
    /// Human-readable detail.
    pub detail: String,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Corrective transitions applied.
    pub corrections: Vec<Correction>,
    /// Orders flagged anomalous during this pass.
    pub anomalies_flagged: usize,
    /// Orders examined (active orders with a venue id, plus defective
    /// ones without).
    pub orders_checked: usize,
    /// When the pass finished.
    pub completed_at: Timestamp,
    /// Wall-clock duration of the pass in milliseconds.
    pub duration_ms: u64,
}

impl ReconciliationReport {
    /// Number of orders corrected in this pass.
    #[must_use]
    pub fn corrected(&self) -> usize {
        self.corrections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_counts_corrections() {
        let report = ReconciliationReport {
            corrections: vec![Correction {
                order_id: OrderId::new("ord-1"),
                venue_order_id: Some(VenueOrderId::new("ven-1")),
                kind: CorrectionKind::CancelledMissing,
                detail: "no venue record".to_string(),
            }],
            anomalies_flagged: 0,
            orders_checked: 3,
            completed_at: Timestamp::now(),
            duration_ms: 12,
        };

        assert_eq!(report.corrected(), 1);
    }

    #[test]
    fn correction_kind_serde() {
        let json = serde_json::to_string(&CorrectionKind::FilledFromVenue).unwrap();
        assert_eq!(json, "\"FILLED_FROM_VENUE\"");
    }
}
