//! # Shared Types Crate
//!
//! This crate contains the domain entities, wire records and outbound port
//! traits shared by every feed subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Post`, `Poster` and `PostCandidate` are
//!   defined once here and flow unchanged from the decoder to the post graph.
//! - **Opaque Collaborators**: the node RPC and the indexer API are described
//!   only by the `NodeRpc` and `IndexerApi` traits; HTTP lives in adapters.
//! - **Read Snapshots**: the decoder sees the post graph through the narrow
//!   `PostLookup` trait and never mutates it.

pub mod entities;
pub mod errors;
pub mod mock;
pub mod params;
pub mod ports;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use mock::{MockIndexerApi, MockNodeRpc, PostTxSpec};
pub use params::ChainParams;
pub use ports::{IndexerApi, NodeRpc, PostLookup};
pub use wire::*;
