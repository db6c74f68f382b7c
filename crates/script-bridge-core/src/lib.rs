//! Call-correlation core for script-bridge.
//!
//! This crate implements the bridge between a host process and a
//! separately scheduled, single-threaded embedded script runtime:
//! - [`Bridge`]: invocation façade and result demultiplexer
//! - [`PendingTable`]: identifier-keyed table of unsettled invocations
//! - [`Dispatcher`]: the one-way seam that crosses the host/runtime boundary
//! - [`InvocationId`] / [`RuntimeId`]: correlation and runtime identities
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Bridge                            │
//! │  invoke(module, function, args)                         │
//! │  1. validate inputs                                     │
//! │  2. mint InvocationId                                   │
//! │  3. register pending entry        ◄── happens-before ──┐│
//! │  4. Dispatcher::dispatch(request)                      ││
//! └───────────────────────────│────────────────────────────┘│
//!                             ▼ (one-way, fire-and-forget)  │
//! ┌─────────────────────────────────────────────────────────┐
//! │               Embedded script runtime                   │
//! │  (own event loop, executes the named function)          │
//! └───────────────────────────│─────────────────────────────┘
//!                             ▼ (out of band, any order)
//! ┌─────────────────────────────────────────────────────────┐
//! │          Bridge::deliver_result(id, payload)            │
//! │  looks up the entry, settles the caller, evicts it      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`PendingTable`] is the only shared mutable state between the two
//! sides. Registration strictly precedes dispatch for every invocation, so
//! a result can never arrive for an identifier the table does not yet hold.

pub mod bridge;
pub mod dispatch;
pub mod id;
pub mod payload;
pub mod registry;

pub use bridge::{Bridge, PendingResult};
pub use dispatch::{DispatchRequest, Dispatcher};
pub use id::{InvocationId, RuntimeId};
pub use payload::{Outcome, ResultPayload};
pub use registry::PendingTable;
