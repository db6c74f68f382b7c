//! Pending-request table.
//!
//! [`PendingTable`] is the single source of truth mapping invocation
//! identifiers to the settlement targets their callers are awaiting. It is
//! the only mutable state shared between the registering path (the host's
//! invocation façade) and the settling path (the result callback arriving
//! from the embedded runtime's scheduling context), so it must stay sound
//! under arbitrary interleaving of the two.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::id::InvocationId;
use crate::payload::Outcome;

use script_bridge_common::BridgeError;

/// One unsettled invocation.
struct PendingEntry {
    /// Settlement target; consumed exactly once.
    sender: oneshot::Sender<Outcome>,
    /// When the entry was registered. Diagnostics only, never persisted.
    registered_at: Instant,
}

/// Identifier-keyed table of unsettled invocations.
///
/// Entries are owned exclusively by the table from registration until
/// settlement; settlement removes the entry atomically with the lookup, so
/// no observer can see an entry survive its own settlement.
///
/// # Thread Safety
///
/// Backed by a [`DashMap`]; the registering side and the settling side may
/// run on different threads.
#[derive(Default)]
pub struct PendingTable {
    entries: DashMap<InvocationId, PendingEntry>,
}

impl PendingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending entry.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already present. Identifier collision indicates a
    /// generator defect or identifier reuse, which is a programmer error
    /// and not a recoverable condition.
    pub fn register(&self, id: InvocationId, sender: oneshot::Sender<Outcome>) {
        let previous = self.entries.insert(
            id,
            PendingEntry {
                sender,
                registered_at: Instant::now(),
            },
        );
        assert!(previous.is_none(), "invocation id registered twice: {id}");
    }

    /// Settle the entry for `id` with the given outcome and evict it.
    ///
    /// A caller that already dropped its pending handle is not an error;
    /// the outcome is discarded quietly.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownInvocation`] if `id` is not pending.
    /// This is a protocol violation by the embedded side (or a duplicate
    /// delivery); it is reported and must never crash the host.
    pub fn settle(&self, id: InvocationId, outcome: Outcome) -> Result<(), BridgeError> {
        let Some((_, entry)) = self.entries.remove(&id) else {
            warn!(%id, "result delivered for unknown invocation");
            return Err(BridgeError::unknown_invocation(id.to_string()));
        };

        if entry.sender.send(outcome).is_err() {
            debug!(%id, "caller dropped its pending handle before settlement");
        }
        Ok(())
    }

    /// Number of currently pending invocations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no invocation is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostic sweep: identifiers pending for at least `threshold`.
    ///
    /// An invocation whose embedded side never replies stays pending
    /// forever; this reports such entries together with their age but
    /// never evicts them.
    pub fn long_pending(&self, threshold: Duration) -> Vec<(InvocationId, Duration)> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter_map(|entry| {
                let age = now.duration_since(entry.value().registered_at);
                (age >= threshold).then_some((*entry.key(), age))
            })
            .collect()
    }
}

impl std::fmt::Debug for PendingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTable")
            .field("pending", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_register_and_settle() {
        let table = PendingTable::new();
        let id = InvocationId::new();
        let (sender, mut receiver) = oneshot::channel();

        table.register(id, sender);
        assert_eq!(table.len(), 1);

        table.settle(id, Ok(json!(3))).unwrap();
        assert!(table.is_empty());
        assert_eq!(receiver.try_recv().unwrap().unwrap(), json!(3));
    }

    #[test]
    fn test_settle_unknown_id() {
        let table = PendingTable::new();
        let id = InvocationId::new();

        let err = table.settle(id, Ok(json!(null))).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownInvocation { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_settle_is_at_most_once() {
        let table = PendingTable::new();
        let id = InvocationId::new();
        let (sender, _receiver) = oneshot::channel();
        table.register(id, sender);

        table.settle(id, Ok(json!(1))).unwrap();
        // Second delivery hits the lookup-miss path, never a double settle.
        let err = table.settle(id, Ok(json!(2))).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownInvocation { .. }));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let table = PendingTable::new();
        let id = InvocationId::new();
        let (first, _rx1) = oneshot::channel();
        let (second, _rx2) = oneshot::channel();

        table.register(id, first);
        table.register(id, second);
    }

    #[test]
    fn test_settle_after_caller_gave_up() {
        let table = PendingTable::new();
        let id = InvocationId::new();
        let (sender, receiver) = oneshot::channel();
        table.register(id, sender);
        drop(receiver);

        // Not an error: the entry is evicted, the outcome discarded.
        table.settle(id, Ok(json!(1))).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_long_pending_sweep() {
        let table = PendingTable::new();
        let id = InvocationId::new();
        let (sender, _receiver) = oneshot::channel();
        table.register(id, sender);

        let stale = table.long_pending(Duration::ZERO);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].0, id);

        assert!(table.long_pending(Duration::from_secs(3600)).is_empty());
        // The sweep never evicts.
        assert_eq!(table.len(), 1);
    }
}
