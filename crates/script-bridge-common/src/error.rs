//! Error types for the script-bridge.
//!
//! This module defines the error hierarchy using `thiserror`:
//! - [`BridgeError`]: every failure the bridge can produce or deliver
//!
//! Errors fall into three groups with different propagation rules:
//! validation errors are raised synchronously before any dispatch,
//! protocol violations are reported but never crash either side, and
//! embedded-side failures travel through the settlement channel of the
//! invocation they belong to.

use serde_json::Value;
use thiserror::Error;

/// Errors produced or delivered by the call-correlation bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The module reference was not a non-empty string.
    ///
    /// Raised synchronously by `invoke`, before any state mutation or
    /// dispatch. No pending entry is left behind.
    #[error("Module must be a non-empty string, got: {got}")]
    InvalidModule {
        /// Rendering of the rejected value.
        got: String,
    },

    /// The function name was not a non-empty string.
    #[error("Function name must be a non-empty string, got: {got}")]
    InvalidFunctionName {
        /// Rendering of the rejected value.
        got: String,
    },

    /// The argument list was not an array.
    #[error("Arguments must be an array, got: {got}")]
    InvalidArgs {
        /// Rendering of the rejected value.
        got: String,
    },

    /// The embedded side delivered a result for an identifier the bridge
    /// does not know about.
    ///
    /// This is a protocol violation: the originating call, if any, is
    /// already settled or was never issued by this bridge. It is reported,
    /// never retried, and must not crash either side.
    #[error("Unknown invocation id: {id}")]
    UnknownInvocation {
        /// The identifier the embedded side referenced.
        id: String,
    },

    /// The embedded side delivered a result with an identifier that does
    /// not parse as an invocation id.
    #[error("Malformed invocation id: {raw}")]
    MalformedInvocationId {
        /// The raw identifier text as received.
        raw: String,
    },

    /// The result payload for a known invocation could not be decoded.
    ///
    /// Delivered through the settlement channel so the caller does not
    /// hang on an undecodable reply.
    #[error("Malformed result payload: {reason}")]
    MalformedPayload {
        /// Description of the decode failure.
        reason: String,
    },

    /// The invoked function failed inside the embedded runtime.
    ///
    /// This is a normal result-channel outcome, not a transport error;
    /// it settles the caller's pending entry.
    #[error("Script execution failed: {value}")]
    ScriptFailure {
        /// The error value reported by the embedded side.
        value: Value,
    },

    /// The bridge was torn down while the invocation was still pending.
    #[error("Bridge closed before the invocation settled")]
    BridgeClosed,
}

impl BridgeError {
    /// Create a new `InvalidModule` error from the rejected value.
    pub fn invalid_module(got: &Value) -> Self {
        Self::InvalidModule { got: got.to_string() }
    }

    /// Create a new `InvalidFunctionName` error from the rejected value.
    pub fn invalid_function_name(got: &Value) -> Self {
        Self::InvalidFunctionName { got: got.to_string() }
    }

    /// Create a new `InvalidArgs` error from the rejected value.
    pub fn invalid_args(got: &Value) -> Self {
        Self::InvalidArgs { got: got.to_string() }
    }

    /// Create a new `UnknownInvocation` error.
    pub fn unknown_invocation(id: impl Into<String>) -> Self {
        Self::UnknownInvocation { id: id.into() }
    }

    /// Create a new `MalformedPayload` error.
    pub fn malformed_payload(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error is a synchronous argument validation
    /// failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidModule { .. } | Self::InvalidFunctionName { .. } | Self::InvalidArgs { .. }
        )
    }

    /// Returns `true` if this error reports a protocol violation by the
    /// embedded side.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownInvocation { .. } | Self::MalformedInvocationId { .. }
        )
    }
}
