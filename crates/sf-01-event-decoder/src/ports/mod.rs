//! # Ports Module
//!
//! Inbound decoding API. The node RPC and graph lookups it needs are the
//! shared `NodeRpc` and `PostLookup` traits.

pub mod inbound;

pub use inbound::*;
