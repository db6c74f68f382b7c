//! Invocation façade and result demultiplexer.
//!
//! [`Bridge`] owns the pending-request table for exactly one embedded
//! runtime. The host side calls [`Bridge::invoke`]; the embedded side (or
//! whatever plumbing carries its callback) calls
//! [`Bridge::deliver_result`]. Both paths meet only at the table.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::dispatch::{DispatchRequest, Dispatcher};
use crate::id::{InvocationId, RuntimeId};
use crate::payload::{Outcome, ResultPayload};
use crate::registry::PendingTable;

use script_bridge_common::{BridgeConfig, BridgeError};

/// Call-correlation bridge bound to one embedded runtime.
///
/// Construction and teardown are explicit: dropping the bridge drops the
/// table and with it every unsettled entry, completing outstanding
/// [`PendingResult`] handles with [`BridgeError::BridgeClosed`]. Multiple
/// independent bridges (for multiple runtimes) are just multiple values.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use serde_json::json;
///
/// use script_bridge_core::{Bridge, DispatchRequest, Dispatcher, RuntimeId};
///
/// struct NullDispatcher;
///
/// impl Dispatcher for NullDispatcher {
///     fn dispatch(&self, _request: DispatchRequest) {}
/// }
///
/// let bridge = Bridge::new(RuntimeId::new(0), Arc::new(NullDispatcher));
/// let _pending = bridge.invoke("Kernel", "+", json!([1, 2])).unwrap();
/// // `_pending` settles once the embedded side delivers a result for
/// // this invocation's identifier.
/// ```
pub struct Bridge {
    runtime_id: RuntimeId,
    table: PendingTable,
    dispatcher: Arc<dyn Dispatcher>,
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge with default configuration.
    pub fn new(runtime_id: RuntimeId, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_config(runtime_id, dispatcher, BridgeConfig::default())
    }

    /// Create a bridge with explicit configuration.
    pub fn with_config(
        runtime_id: RuntimeId,
        dispatcher: Arc<dyn Dispatcher>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            runtime_id,
            table: PendingTable::new(),
            dispatcher,
            config,
        }
    }

    /// Identity of the runtime this bridge is bound to.
    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime_id
    }

    /// Number of invocations currently awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.table.len()
    }

    /// Invoke a named function inside the embedded runtime.
    ///
    /// All three inputs arrive as JSON values because the host boundary is
    /// dynamically typed: `module` and `function_name` must be non-empty
    /// strings, `args` an array (empty permitted). Validation happens
    /// before any state mutation or dispatch, so a rejected call leaves no
    /// pending entry behind.
    ///
    /// On success the returned [`PendingResult`] completes when (and only
    /// when) the embedded side delivers a result for this invocation's
    /// identifier; `invoke` itself never blocks on the embedded side.
    ///
    /// # Errors
    ///
    /// Returns a distinct validation error per argument kind:
    /// [`BridgeError::InvalidModule`], [`BridgeError::InvalidFunctionName`],
    /// or [`BridgeError::InvalidArgs`].
    pub fn invoke(
        &self,
        module: impl Into<Value>,
        function_name: impl Into<Value>,
        args: impl Into<Value>,
    ) -> Result<PendingResult, BridgeError> {
        let module = module.into();
        let function_name = function_name.into();
        let args = args.into();

        let Some(module) = as_non_empty_str(&module) else {
            return Err(BridgeError::invalid_module(&module));
        };
        let Some(function_name) = as_non_empty_str(&function_name) else {
            return Err(BridgeError::invalid_function_name(&function_name));
        };
        let Value::Array(args) = args else {
            return Err(BridgeError::invalid_args(&args));
        };

        let id = InvocationId::new();
        let (sender, receiver) = oneshot::channel();

        // Register strictly before dispatch: a result must never be able
        // to arrive for an identifier the table does not yet hold, even if
        // the dispatcher replies synchronously.
        self.table.register(id, sender);
        self.dispatcher.dispatch(DispatchRequest {
            runtime_id: self.runtime_id,
            invocation_id: id,
            module: module.to_string(),
            function_name: function_name.to_string(),
            args: Value::Array(args).to_string(),
        });

        debug!(%id, runtime_id = %self.runtime_id, "invocation dispatched");
        Ok(PendingResult { receiver })
    }

    /// Result delivery entry point for the embedded runtime.
    ///
    /// Callable at any time after dispatch, from any thread the embedded
    /// runtime's plumbing happens to use. The identifier arrives in string
    /// form exactly as it was carried in the dispatch request; the payload
    /// is the wire text described in [`ResultPayload`]. An undecodable
    /// payload for a known identifier settles the caller with
    /// [`BridgeError::MalformedPayload`] rather than leaving it pending.
    ///
    /// # Errors
    ///
    /// Returns a protocol-violation error for a malformed or unknown
    /// identifier (including duplicate deliveries). Violations are also
    /// logged; they never panic and leave the table untouched.
    pub fn deliver_result(&self, raw_id: &str, payload: &str) -> Result<(), BridgeError> {
        let id = match raw_id.parse::<InvocationId>() {
            Ok(id) => id,
            Err(err) => {
                warn!(raw_id, "discarding result with malformed invocation id");
                return Err(err);
            }
        };

        let outcome: Outcome = match ResultPayload::decode(payload) {
            Ok(payload) => payload.into_outcome(),
            Err(err) => Err(err),
        };

        self.table.settle(id, outcome)
    }

    /// Report invocations pending longer than the configured threshold.
    ///
    /// Purely diagnostic; nothing is evicted and no timeout is implied.
    pub fn sweep_long_pending(&self) -> Vec<(InvocationId, Duration)> {
        let stale = self.table.long_pending(self.config.long_pending_threshold());
        if self.config.warn_on_long_pending {
            for (id, age) in &stale {
                warn!(%id, age_secs = age.as_secs(), "invocation pending past threshold");
            }
        }
        stale
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("runtime_id", &self.runtime_id)
            .field("pending", &self.table.len())
            .finish_non_exhaustive()
    }
}

fn as_non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Eventual-result handle returned by [`Bridge::invoke`].
///
/// Completes exactly once, with whatever outcome the embedded side
/// delivers for this invocation's identifier. If the embedded side never
/// replies, the future never completes; only tearing down the bridge
/// converts that into [`BridgeError::BridgeClosed`].
#[derive(Debug)]
pub struct PendingResult {
    receiver: oneshot::Receiver<Outcome>,
}

impl Future for PendingResult {
    type Output = Result<Value, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|settled| match settled {
            Ok(outcome) => outcome,
            Err(_) => Err(BridgeError::BridgeClosed),
        })
    }
}
