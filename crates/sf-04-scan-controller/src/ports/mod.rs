//! # Ports Module

pub mod inbound;

pub use inbound::ScanControlApi;
