//! # Ports Module
//!
//! Inbound API of the post graph. Reads by the decoder go through
//! `shared_types::PostLookup`.

pub mod inbound;

pub use inbound::*;
