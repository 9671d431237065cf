//! Reconciliation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the periodic reconciliation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Interval between periodic passes, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound of the random jitter added to each interval, in
    /// milliseconds. Keeps many engine instances from polling the venue
    /// in lockstep.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl ReconciliationConfig {
    /// The base interval as a `Duration`.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

const fn default_interval_secs() -> u64 {
    300 // 5 minutes
}

const fn default_jitter_ms() -> u64 {
    500
}
