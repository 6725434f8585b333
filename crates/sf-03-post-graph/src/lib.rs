//! # SF-03 Post Graph
//!
//! Folds decoded post candidates into the reconciled feed: posts, posters,
//! the reply tree, two direction-specific orphan trees and the de-orphaned
//! tree.
//!
//! **Subsystem ID:** 3
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Post ids are unique; a duplicate is a no-op | `domain/reconciler.rs` - `reconcile()` early return |
//! | A child sits in at most one of reply/forward-orphan/backward-orphan | `domain/invariants.rs` |
//! | Ordinals per parent are contiguous from 0 | `domain/tree.rs` - slots are cleared, never removed |
//! | Orphan status is transitive | `domain/reconciler.rs` - cascade only from attached parents |
//!
//! ## Module Structure
//!
//! ```text
//! sf-03-post-graph/
//! ├── domain/          # OrdinalTree, GraphState, GraphDelta, reconcile, views
//! ├── ports/           # PostGraphApi (inbound)
//! └── application/     # PostGraphStore, the single merge point
//! ```

#![warn(clippy::all)]

pub mod application;
pub mod domain;
pub mod ports;

pub use application::PostGraphStore;
pub use domain::{
    reconcile, BatchCursor, ChannelRules, ChildRef, FeedSnapshot, GraphDelta, GraphState,
    OrdinalTree, PostMutation, ReplyView, ThreadView, TreeSlot,
};
pub use ports::{MergeOutcome, PostGraphApi};
