//! In-process stand-in for the embedded script runtime.
//!
//! [`LoopbackRuntime`] consumes dispatch requests from a channel on its
//! own tokio task, executes registered handler functions, and delivers the
//! encoded result back through the bridge's delivery entry point. It gives
//! the demo binary and the tests a complete round trip without embedding a
//! real script engine.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use script_bridge_core::{Bridge, DispatchRequest, ResultPayload};

/// A registered function: arguments in, success value or error value out.
type Handler = Box<dyn Fn(Vec<Value>) -> Result<Value, Value> + Send + Sync>;

/// Builder for [`LoopbackRuntime`].
#[derive(Default)]
pub struct LoopbackRuntimeBuilder {
    functions: HashMap<(String, String), Handler>,
}

impl LoopbackRuntimeBuilder {
    /// Register a function under `(module, name)`.
    pub fn function<F>(mut self, module: &str, name: &str, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        self.functions
            .insert((module.to_string(), name.to_string()), Box::new(handler));
        self
    }

    /// Build the runtime.
    pub fn build(self) -> LoopbackRuntime {
        LoopbackRuntime {
            functions: self.functions,
        }
    }
}

/// In-process embedded-runtime stand-in.
///
/// Single-threaded in the same sense as the real thing: one task drains
/// the dispatch channel and executes functions sequentially, delivering
/// results out of band relative to the host's own scheduling.
pub struct LoopbackRuntime {
    functions: HashMap<(String, String), Handler>,
}

impl LoopbackRuntime {
    /// Start building a runtime.
    pub fn builder() -> LoopbackRuntimeBuilder {
        LoopbackRuntimeBuilder::default()
    }

    /// Spawn the runtime loop.
    ///
    /// The task holds only a weak handle to the bridge, so the bridge's
    /// lifetime stays with the host. Dropping the bridge drops its
    /// dispatcher and with it the last sender, which closes the channel
    /// and ends the loop; the returned handle then completes.
    pub fn spawn(
        self,
        bridge: &Arc<Bridge>,
        mut requests: mpsc::UnboundedReceiver<DispatchRequest>,
    ) -> JoinHandle<()> {
        let bridge: Weak<Bridge> = Arc::downgrade(bridge);
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                let id = request.invocation_id;
                let payload = self.execute(&request);
                let text = match payload.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        error!(%id, error = %err, "failed to encode result payload");
                        continue;
                    }
                };
                let Some(bridge) = bridge.upgrade() else {
                    debug!("loopback runtime stopped: bridge dropped");
                    return;
                };
                if let Err(err) = bridge.deliver_result(&id.to_string(), &text) {
                    warn!(%id, error = %err, "bridge rejected loopback result");
                }
            }
            debug!("loopback runtime stopped: dispatch channel closed");
        })
    }

    /// Execute one request against the registered function table.
    ///
    /// Failures stay inside the result channel: an unknown function or
    /// undecodable argument list produces an error payload, exactly like a
    /// function that fails inside a real embedded runtime.
    fn execute(&self, request: &DispatchRequest) -> ResultPayload {
        let args: Vec<Value> = match serde_json::from_str(&request.args) {
            Ok(args) => args,
            Err(err) => {
                return ResultPayload::Error(json!(format!("invalid argument list: {err}")));
            }
        };

        let key = (request.module.clone(), request.function_name.clone());
        match self.functions.get(&key) {
            Some(handler) => match handler(args) {
                Ok(value) => ResultPayload::Ok(value),
                Err(value) => ResultPayload::Error(value),
            },
            None => ResultPayload::Error(json!(format!(
                "undefined function {}.{}",
                request.module, request.function_name
            ))),
        }
    }
}

impl std::fmt::Debug for LoopbackRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackRuntime")
            .field("functions", &self.functions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use script_bridge_common::BridgeError;
    use script_bridge_core::RuntimeId;

    use crate::channel::ChannelDispatcher;

    use super::*;

    fn arithmetic_runtime() -> LoopbackRuntime {
        LoopbackRuntime::builder()
            .function("Kernel", "+", |args| {
                let mut total = 0i64;
                for arg in args {
                    total += arg
                        .as_i64()
                        .ok_or_else(|| json!("argument is not an integer"))?;
                }
                Ok(json!(total))
            })
            .function("Kernel", "fail", |_args| Err(json!("boom")))
            .build()
    }

    #[tokio::test]
    async fn test_round_trip_success() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));
        let worker = arithmetic_runtime().spawn(&bridge, requests);

        let result = bridge
            .invoke("Kernel", "+", json!([1, 2]))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(result, json!(3));

        drop(bridge);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_failure() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));
        let _worker = arithmetic_runtime().spawn(&bridge, requests);

        let err = bridge
            .invoke("Kernel", "fail", json!([]))
            .unwrap()
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ScriptFailure { value } if value == json!("boom")));
    }

    #[tokio::test]
    async fn test_undefined_function_reports_through_result_channel() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));
        let _worker = arithmetic_runtime().spawn(&bridge, requests);

        let err = bridge
            .invoke("Kernel", "missing", json!([]))
            .unwrap()
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ScriptFailure { .. }));
    }

    #[tokio::test]
    async fn test_worker_stops_once_bridge_is_dropped() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));
        let worker = arithmetic_runtime().spawn(&bridge, requests);

        let result = bridge
            .invoke("Kernel", "+", json!([1, 2]))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(result, json!(3));

        // The worker must not keep the dispatch channel alive on its own.
        drop(bridge);
        tokio::time::timeout(std::time::Duration::from_secs(5), worker)
            .await
            .expect("worker task should stop after the bridge is dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_invocations_settle_independently() {
        let (dispatcher, requests) = ChannelDispatcher::new();
        let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));
        let _worker = arithmetic_runtime().spawn(&bridge, requests);

        let first = bridge.invoke("Kernel", "+", json!([1, 2])).unwrap();
        let second = bridge.invoke("Kernel", "+", json!([10, 20])).unwrap();

        assert_eq!(second.await.unwrap(), json!(30));
        assert_eq!(first.await.unwrap(), json!(3));
    }
}
