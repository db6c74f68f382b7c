//! Common types, errors, and utilities for script-bridge.
//!
//! This crate provides shared functionality used across the script-bridge workspace:
//! - Error types using `thiserror` for type-safe error handling
//! - Configuration structures for bridge diagnostics
//! - Common type definitions

pub mod config;
pub mod error;

pub use config::BridgeConfig;
pub use error::BridgeError;
