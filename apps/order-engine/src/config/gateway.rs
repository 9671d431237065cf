//! Venue gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for venue gateway calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bounded timeout for a single gateway call, in milliseconds.
    ///
    /// A call exceeding this is treated as timed out; the affected order
    /// is left in its pre-call state for reconciliation.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl GatewayConfig {
    /// The call timeout as a `Duration`.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

const fn default_call_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout() {
        let config = GatewayConfig::default();
        assert_eq!(config.call_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn custom_timeout_deserializes() {
        let config: GatewayConfig = serde_yaml_bw::from_str("call_timeout_ms: 250").unwrap();
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
    }
}
