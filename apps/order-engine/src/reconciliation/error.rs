//! Reconciliation errors.

use thiserror::Error;

use crate::domain::order::StoreError;
use crate::gateway::GatewayError;

/// Errors that abort a reconciliation pass.
///
/// A failed pass changes nothing; the next periodic tick retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// The venue could not be queried.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The order store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_gateway_error() {
        let err: ReconciliationError =
            GatewayError::Unavailable("venue down".to_string()).into();
        assert!(matches!(err, ReconciliationError::Gateway(_)));
        assert!(format!("{err}").contains("venue down"));
    }
}
