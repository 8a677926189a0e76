//! Relay contract client implementations.
//!
//! Available implementations:
//! - `evm`: JSON-RPC client for EVM chains built on alloy

pub mod evm;
