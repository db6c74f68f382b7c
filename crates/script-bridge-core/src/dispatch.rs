//! The dispatch seam between the host and the embedded runtime.
//!
//! [`Dispatcher`] is the one-way, fire-and-forget primitive that crosses
//! the boundary; the bridge only ever calls it after the matching pending
//! entry is registered. The external collaborator behind it is responsible
//! for executing the requested call inside the embedded runtime and
//! eventually delivering a result back through
//! [`Bridge::deliver_result`](crate::Bridge::deliver_result) with the same
//! identifier.

use crate::id::{InvocationId, RuntimeId};

/// Everything the embedded side needs to execute one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Identity of the runtime this bridge is bound to.
    pub runtime_id: RuntimeId,

    /// Correlation identifier; echoed back verbatim with the result.
    pub invocation_id: InvocationId,

    /// Module reference, uninterpreted by the bridge.
    pub module: String,

    /// Function name within the module, uninterpreted by the bridge.
    pub function_name: String,

    /// JSON-serialized argument list.
    pub args: String,
}

/// One-way dispatch primitive.
///
/// `dispatch` must be non-blocking from the caller's perspective and
/// returns nothing; delivery failures on the far side surface, at most, as
/// an invocation that never settles.
///
/// # Thread Safety
///
/// Implementations are shared behind an `Arc` and may be called from any
/// thread the host schedules `invoke` on.
pub trait Dispatcher: Send + Sync {
    /// Hand a request across the host/runtime boundary.
    fn dispatch(&self, request: DispatchRequest);
}
