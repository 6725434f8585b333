//! # Application Module
//!
//! The shared store wrapping `GraphState` behind a single merge point.

pub mod store;

pub use store::PostGraphStore;
