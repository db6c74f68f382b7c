//! Host-side dispatcher implementations for script-bridge.
//!
//! The core crate defines the [`Dispatcher`](script_bridge_core::Dispatcher)
//! seam; this crate provides the implementations the host actually wires in:
//! - [`ChannelDispatcher`]: hands requests to the embedded side over an
//!   unbounded mpsc channel
//! - [`LoopbackRuntime`]: an in-process stand-in for the embedded runtime,
//!   used by the demo binary and by tests

pub mod channel;
pub mod loopback;

pub use channel::ChannelDispatcher;
pub use loopback::LoopbackRuntime;
