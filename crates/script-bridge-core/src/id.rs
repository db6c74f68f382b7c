//! Correlation and runtime identities.
//!
//! - [`InvocationId`]: unique token correlating a request with its result
//! - [`RuntimeId`]: identity of the embedded runtime a bridge is bound to

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use script_bridge_common::BridgeError;

/// Unique identifier for one invocation.
///
/// Minted fresh per call from a v4 UUID, used exactly once as a
/// [`PendingTable`](crate::PendingTable) key, and never derived from
/// payload content. The embedded side echoes it back verbatim in string
/// form with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Mint a fresh identifier.
    ///
    /// Infallible; collision probability across a process lifetime is
    /// negligible.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for InvocationId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| BridgeError::MalformedInvocationId { raw: s.to_string() })
    }
}

/// Identity of the embedded runtime a bridge instance is bound to.
///
/// Carried in every dispatch request so the external dispatch primitive
/// can address the right runtime; the bridge itself never interprets it
/// and manages exactly one runtime per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(u64);

impl RuntimeId {
    /// Create a runtime identity from its raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let id = InvocationId::new();
        let parsed: InvocationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_malformed_id_rejected() {
        let err = "not-a-uuid".parse::<InvocationId>().unwrap_err();
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn test_fresh_ids_are_distinct() {
        assert_ne!(InvocationId::new(), InvocationId::new());
    }

    #[test]
    fn test_runtime_id_round_trip() {
        let id = RuntimeId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }
}
