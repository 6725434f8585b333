//! # Graph Invariants
//!
//! Checks over a `GraphState` that must hold after every merge.

use std::collections::HashMap;

use super::state::GraphState;

/// A child occupies a slot in at most one of the reply tree and the two
/// orphan trees.
pub fn invariant_single_membership(state: &GraphState) -> bool {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for tree in [
        &state.reply_tree,
        &state.forward_orphans,
        &state.backward_orphans,
    ] {
        for (_, child) in tree.edges() {
            *seen.entry(child).or_insert(0) += 1;
        }
    }
    seen.values().all(|count| *count == 1)
}

/// Reply tree ordinals are contiguous from 0 with no empty slot. Orphan
/// trees may hold cleared slots but never skip an index.
pub fn invariant_contiguous(state: &GraphState) -> bool {
    state
        .reply_tree
        .parents()
        .all(|parent| state.reply_tree.slots(parent).iter().all(Option::is_some))
        && state
            .deorphaned
            .parents()
            .all(|parent| state.deorphaned.slots(parent).iter().all(Option::is_some))
}

/// A post is orphaned exactly when it sits in an orphan tree, and every
/// child parked under an orphaned or unknown parent is orphaned too.
pub fn invariant_orphan_closure(state: &GraphState) -> bool {
    let reply_ok = state.reply_tree.edges().iter().all(|(parent, child)| {
        state.parent_attached(parent)
            && state.posts.get(child).is_some_and(|post| !post.orphaned)
    });
    let orphans_ok = [&state.forward_orphans, &state.backward_orphans]
        .iter()
        .flat_map(|tree| tree.edges())
        .all(|(parent, child)| {
            !state.parent_attached(&parent)
                && state.posts.get(&child).is_some_and(|post| post.orphaned)
        });
    reply_ok && orphans_ok
}

/// All graph invariants.
pub fn check_all(state: &GraphState) -> bool {
    invariant_single_membership(state)
        && invariant_contiguous(state)
        && invariant_orphan_closure(state)
}
