//! Configuration structures for the script-bridge.
//!
//! The bridge itself has deliberately few knobs: no timeouts, no queue
//! bounds, no retry policy. What remains configurable is diagnostics for
//! entries that stay pending far longer than expected.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bridge configuration.
///
/// Can be loaded from files (TOML, JSON) or built in code. All fields have
/// defaults suitable for tests and embedding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Threshold in seconds after which a still-pending invocation is
    /// considered long-pending by the diagnostic sweep.
    ///
    /// An invocation whose embedded side never replies stays pending
    /// forever; the sweep only reports such entries, it never evicts them.
    #[serde(default = "defaults::long_pending_warn_secs")]
    pub long_pending_warn_secs: u64,

    /// Emit a `tracing` warning for each long-pending entry found by the
    /// sweep.
    #[serde(default = "defaults::warn_on_long_pending")]
    pub warn_on_long_pending: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            long_pending_warn_secs: defaults::long_pending_warn_secs(),
            warn_on_long_pending: defaults::warn_on_long_pending(),
        }
    }
}

impl BridgeConfig {
    /// Get the long-pending threshold as a `Duration`.
    pub fn long_pending_threshold(&self) -> Duration {
        Duration::from_secs(self.long_pending_warn_secs)
    }
}

/// Default value functions for serde.
mod defaults {
    pub const fn long_pending_warn_secs() -> u64 {
        60
    }

    pub const fn warn_on_long_pending() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();

        assert_eq!(config.long_pending_warn_secs, 60);
        assert!(config.warn_on_long_pending);
    }

    #[test]
    fn test_config_serialization() {
        let config = BridgeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: BridgeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            config.long_pending_warn_secs,
            deserialized.long_pending_warn_secs
        );
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"long_pending_warn_secs": 5}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();

        // Explicitly set value
        assert_eq!(config.long_pending_warn_secs, 5);
        // Default values for unspecified fields
        assert!(config.warn_on_long_pending);
    }

    #[test]
    fn test_threshold_duration() {
        let config = BridgeConfig {
            long_pending_warn_secs: 3,
            ..Default::default()
        };

        assert_eq!(
            config.long_pending_threshold(),
            std::time::Duration::from_secs(3)
        );
    }
}
