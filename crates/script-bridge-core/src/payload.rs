//! Wire format of result payloads and the settled outcome type.
//!
//! Result payloads cross the runtime/host boundary as externally tagged
//! JSON text: `{"ok": <value>}` for success, `{"error": <value>}` for an
//! embedded-side failure. The bridge never interprets the inner value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use script_bridge_common::BridgeError;

/// The settled outcome of one invocation, as observed by the caller.
pub type Outcome = Result<Value, BridgeError>;

/// Decoded result payload as delivered by the embedded runtime.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ResultPayload {
    /// The invoked function completed with a value.
    #[serde(rename = "ok")]
    Ok(Value),

    /// The invoked function failed; the value is the runtime's error term.
    #[serde(rename = "error")]
    Error(Value),
}

impl ResultPayload {
    /// Decode a payload from its wire text.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedPayload`] if the text is not valid
    /// JSON in the expected shape.
    pub fn decode(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text).map_err(|e| BridgeError::malformed_payload(e.to_string()))
    }

    /// Encode the payload as wire text.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedPayload`] if serialization fails.
    pub fn encode(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|e| BridgeError::malformed_payload(e.to_string()))
    }

    /// Convert into the outcome delivered to the caller.
    ///
    /// An embedded-side failure becomes [`BridgeError::ScriptFailure`];
    /// it travels through the normal settlement channel, never as a
    /// transport error.
    pub fn into_outcome(self) -> Outcome {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error(value) => Err(BridgeError::ScriptFailure { value }),
        }
    }
}
