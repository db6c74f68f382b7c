//! Channel-backed dispatch primitive.
//!
//! The embedded runtime runs its own event loop on its own thread; the
//! natural handoff from the host is an unbounded mpsc channel whose
//! receiving end that loop consumes. Sending is non-blocking, which keeps
//! the fire-and-forget contract of the dispatch seam.

use tokio::sync::mpsc;
use tracing::warn;

use script_bridge_core::{DispatchRequest, Dispatcher};

/// Dispatcher that forwards requests over an unbounded channel.
///
/// A send into a closed channel means the runtime side is gone. Per the
/// dispatch contract that is not an error the caller can observe: the
/// request is dropped with a warning and the invocation simply never
/// settles.
#[derive(Clone)]
pub struct ChannelDispatcher {
    sender: mpsc::UnboundedSender<DispatchRequest>,
}

impl ChannelDispatcher {
    /// Create a dispatcher together with the receiving end the embedded
    /// side consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DispatchRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, request: DispatchRequest) {
        if self.sender.send(request).is_err() {
            warn!("dispatch dropped: embedded runtime channel is closed");
        }
    }
}

impl std::fmt::Debug for ChannelDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelDispatcher")
            .field("closed", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use script_bridge_core::{InvocationId, RuntimeId};

    use super::*;

    fn request() -> DispatchRequest {
        DispatchRequest {
            runtime_id: RuntimeId::new(0),
            invocation_id: InvocationId::new(),
            module: "Kernel".into(),
            function_name: "+".into(),
            args: "[1,2]".into(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_receiver() {
        let (dispatcher, mut receiver) = ChannelDispatcher::new();

        let sent = request();
        dispatcher.dispatch(sent.clone());

        assert_eq!(receiver.recv().await.unwrap(), sent);
    }

    #[tokio::test]
    async fn test_dispatch_into_closed_channel_does_not_panic() {
        let (dispatcher, receiver) = ChannelDispatcher::new();
        drop(receiver);

        dispatcher.dispatch(request());
    }
}
