//! # Domain Layer - Post Graph
//!
//! Pure reconciliation logic.
//!
//! ## Components
//!
//! - `tree`: `OrdinalTree`, the dense `"<parent>-<index>"` adjacency
//! - `state`: `GraphState` and its single mutation path `apply`
//! - `delta`: `GraphDelta`, the change set of one candidate
//! - `reconciler`: placement and the de-orphan cascade
//! - `views`: thread, children and snapshot read models
//! - `invariants`: checks that hold after every merge

pub mod delta;
pub mod invariants;
pub mod reconciler;
pub mod state;
pub mod tree;
pub mod views;

pub use delta::{GraphDelta, PostMutation};
pub use invariants::{
    check_all, invariant_contiguous, invariant_orphan_closure, invariant_single_membership,
};
pub use reconciler::reconcile;
pub use state::{BatchCursor, ChannelRules, GraphState};
pub use tree::{ordinal_key, OrdinalTree, TreeSlot};
pub use views::{ChildRef, FeedSnapshot, ReplyView, ThreadView};
