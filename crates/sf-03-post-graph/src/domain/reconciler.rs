//! # Reconciler
//!
//! Computes the `GraphDelta` for one candidate against a read-only
//! `GraphState`.
//!
//! ## Placement
//!
//! | Target T | Placement |
//! |----------|-----------|
//! | empty | root post, no tree edge |
//! | unknown or orphaned | next ordinal under T in the orphan tree of the scan direction, `orphaned = true` |
//! | attached | next ordinal under T in the reply tree |
//!
//! ## De-orphan cascade
//!
//! Once the candidate is attached, its pending orphan children (and those of
//! its discussion channel) are promoted: forward orphans reversed, then
//! backward orphans in order, appended to the reply tree with fresh
//! ordinals. Every promoted post is then treated as a parent in turn, using
//! an explicit stack.

use std::collections::{HashMap, HashSet};

use shared_types::{DiscussionChannel, PostCandidate, PostId, ScanDirection};

use super::delta::{GraphDelta, PostMutation};
use super::state::GraphState;
use super::tree::{OrdinalTree, TreeSlot};

/// Compute the delta for `candidate` scanned in `direction`.
///
/// A candidate whose id is already known yields an empty delta.
pub fn reconcile(
    state: &GraphState,
    candidate: &PostCandidate,
    direction: ScanDirection,
) -> GraphDelta {
    let post_id = &candidate.post.post_id;
    if state.posts.contains_key(post_id) {
        return GraphDelta::default();
    }

    let mut delta = GraphDelta::default();

    if let Some(poster) = &candidate.new_poster {
        if !state.posters.contains_key(&poster.address) {
            delta.new_poster = Some(poster.clone());
        }
    }

    if let Some(channel) = &candidate.discussion {
        let orphaned = !state.parent_attached(&channel.root_post_id);
        let refreshed = DiscussionChannel {
            orphaned,
            ..channel.clone()
        };
        if state.channels.get(&channel.channel_id) != Some(&refreshed) {
            delta.channel = Some(refreshed);
        }
    }

    let mut post = candidate.post.clone();
    post.orphaned = false;

    let target = candidate.placement_target();
    let mut reply_cursor = OrdinalCursor::default();
    let attached = if target.is_empty() {
        if post.is_root(&state.rules.main_channel_id) {
            delta.new_root = Some(post_id.clone());
        }
        true
    } else if state.parent_attached(target) {
        let index = reply_cursor.next(&state.reply_tree, target);
        delta
            .reply_tree
            .push(TreeSlot::occupied(target, index, post_id.clone()));
        true
    } else {
        let (tree, slots) = match direction {
            ScanDirection::Forward => (&state.forward_orphans, &mut delta.forward_orphans),
            ScanDirection::Backward => (&state.backward_orphans, &mut delta.backward_orphans),
        };
        slots.push(TreeSlot::occupied(
            target,
            tree.next_index(target),
            post_id.clone(),
        ));
        post.orphaned = true;
        false
    };

    delta.new_post = Some(post);

    if attached {
        cascade(state, post_id, &mut reply_cursor, &mut delta);
    }

    delta
}

/// Next-ordinal bookkeeping for appends not yet applied to the base tree.
#[derive(Default)]
struct OrdinalCursor {
    pending: HashMap<String, usize>,
}

impl OrdinalCursor {
    fn next(&mut self, base: &OrdinalTree, parent: &str) -> usize {
        let appended = self.pending.entry(parent.to_string()).or_insert(0);
        let index = base.next_index(parent) + *appended;
        *appended += 1;
        index
    }
}

fn cascade(
    state: &GraphState,
    attached_id: &PostId,
    reply_cursor: &mut OrdinalCursor,
    delta: &mut GraphDelta,
) {
    let rules = &state.rules;
    let mut deorphan_cursor = OrdinalCursor::default();
    let mut visited: HashSet<String> = HashSet::new();

    let mut stack = Vec::new();
    push_parent(&mut stack, rules.discussion_of(attached_id), attached_id.clone());
    reattach_channel(state, &rules.discussion_of(attached_id), delta);

    while let Some(parent) = stack.pop() {
        if !visited.insert(parent.clone()) {
            continue;
        }

        let forward = state.forward_orphans.occupied(&parent);
        let backward = state.backward_orphans.occupied(&parent);
        if forward.is_empty() && backward.is_empty() {
            continue;
        }

        for (index, _) in &forward {
            delta
                .forward_orphans
                .push(TreeSlot::cleared(parent.clone(), *index));
        }
        for (index, _) in &backward {
            delta
                .backward_orphans
                .push(TreeSlot::cleared(parent.clone(), *index));
        }

        let merged: Vec<PostId> = forward
            .into_iter()
            .rev()
            .chain(backward)
            .map(|(_, child)| child)
            .collect();

        for child in &merged {
            let index = reply_cursor.next(&state.reply_tree, &parent);
            delta
                .reply_tree
                .push(TreeSlot::occupied(parent.clone(), index, child.clone()));
            let index = deorphan_cursor.next(&state.deorphaned, &parent);
            delta
                .deorphaned
                .push(TreeSlot::occupied(parent.clone(), index, child.clone()));
            delta.post_mutations.push(PostMutation {
                post_id: child.clone(),
                orphaned: false,
            });
            reattach_channel(state, &rules.discussion_of(child), delta);
        }

        for child in merged.into_iter().rev() {
            push_parent(&mut stack, rules.discussion_of(&child), child);
        }
    }
}

/// Push a post and its discussion channel so the post pops first.
fn push_parent(stack: &mut Vec<String>, channel_id: String, post_id: PostId) {
    stack.push(channel_id);
    stack.push(post_id);
}

fn reattach_channel(state: &GraphState, channel_id: &str, delta: &mut GraphDelta) {
    if state.channels.get(channel_id).is_some_and(|c| c.orphaned) {
        delta.channel_mutations.push((channel_id.to_string(), false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{BatchCursor, ChannelRules};
    use shared_types::{Post, Poster};

    fn candidate(id: &str, reply_to: &str, ts: u64) -> PostCandidate {
        PostCandidate {
            post: Post {
                post_id: id.to_string(),
                poster: "0xa".to_string(),
                message: format!("post {id}"),
                timestamp: ts,
                tx_hash: format!("0x{id}"),
                block_height: None,
                reply_to_post_id: reply_to.to_string(),
                channel_id: String::new(),
                orphaned: false,
            },
            new_poster: None,
            discussion: None,
        }
    }

    fn comment(id: &str, root: &str, ts: u64) -> PostCandidate {
        let mut c = candidate(id, "", ts);
        c.post.channel_id = format!("discuss:{root}");
        c.discussion = Some(DiscussionChannel {
            channel_id: format!("discuss:{root}"),
            root_post_id: root.to_string(),
            orphaned: true,
        });
        c
    }

    fn merge(state: &mut GraphState, c: &PostCandidate, dir: ScanDirection) -> GraphDelta {
        let delta = reconcile(state, c, dir);
        let mut cursor = BatchCursor::new(dir);
        state.apply(delta.clone(), &mut cursor);
        delta
    }

    fn state() -> GraphState {
        GraphState::new(ChannelRules::default())
    }

    #[test]
    fn test_root_post_has_no_edge() {
        let mut s = state();
        let delta = merge(&mut s, &candidate("A", "", 100), ScanDirection::Forward);
        assert_eq!(delta.new_root.as_deref(), Some("A"));
        assert!(delta.reply_tree.is_empty());
        assert!(!s.post("A").unwrap().orphaned);
    }

    #[test]
    fn test_duplicate_yields_empty_delta() {
        let mut s = state();
        let c = candidate("A", "", 100);
        merge(&mut s, &c, ScanDirection::Forward);
        assert!(reconcile(&s, &c, ScanDirection::Backward).is_empty());
    }

    #[test]
    fn test_reply_to_known_parent() {
        let mut s = state();
        merge(&mut s, &candidate("P", "", 90), ScanDirection::Forward);
        merge(&mut s, &candidate("R", "P", 110), ScanDirection::Forward);
        assert_eq!(s.reply_tree().to_keyed_map().get("P-0"), Some(&"R".to_string()));
        assert!(!s.post("R").unwrap().orphaned);
    }

    #[test]
    fn test_orphan_then_parent_cascades() {
        let mut s = state();
        merge(&mut s, &candidate("R", "P1", 110), ScanDirection::Forward);
        assert!(s.post("R").unwrap().orphaned);
        assert_eq!(
            s.orphan_tree(ScanDirection::Forward).to_keyed_map().get("P1-0"),
            Some(&"R".to_string())
        );

        let delta = merge(&mut s, &candidate("P1", "", 90), ScanDirection::Forward);
        assert_eq!(delta.deorphaned_ids(), vec!["R".to_string()]);
        assert_eq!(s.reply_tree().to_keyed_map().get("P1-0"), Some(&"R".to_string()));
        assert!(!s.post("R").unwrap().orphaned);
        assert!(s.orphan_tree(ScanDirection::Forward).is_empty());
        assert_eq!(s.orphan_tree(ScanDirection::Forward).slots("P1").len(), 1);
        assert!(s.deorphaned_tree().has_child("P1", "R"));
    }

    #[test]
    fn test_orphan_direction_follows_scan() {
        let mut s = state();
        merge(&mut s, &candidate("F", "X", 10), ScanDirection::Forward);
        merge(&mut s, &candidate("B", "X", 11), ScanDirection::Backward);
        assert!(s.orphan_tree(ScanDirection::Forward).has_child("X", "F"));
        assert!(s.orphan_tree(ScanDirection::Backward).has_child("X", "B"));
    }

    #[test]
    fn test_merge_order_forward_reversed_then_backward() {
        let mut s = state();
        merge(&mut s, &candidate("f1", "X", 30), ScanDirection::Forward);
        merge(&mut s, &candidate("f2", "X", 20), ScanDirection::Forward);
        merge(&mut s, &candidate("b1", "X", 5), ScanDirection::Backward);
        merge(&mut s, &candidate("b2", "X", 6), ScanDirection::Backward);

        merge(&mut s, &candidate("X", "", 1), ScanDirection::Backward);
        assert_eq!(
            s.reply_tree().children("X"),
            vec!["f2", "f1", "b1", "b2"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_transitive_orphan_and_deep_cascade() {
        let mut s = state();
        merge(&mut s, &candidate("C", "B", 30), ScanDirection::Backward);
        merge(&mut s, &candidate("B", "A", 20), ScanDirection::Backward);
        // B's parent is unknown, so C stays parked under B.
        assert!(s.post("B").unwrap().orphaned);
        assert!(s.post("C").unwrap().orphaned);
        assert!(s.reply_tree().is_empty());

        merge(&mut s, &candidate("A", "", 10), ScanDirection::Backward);
        assert!(!s.post("B").unwrap().orphaned);
        assert!(!s.post("C").unwrap().orphaned);
        assert!(s.reply_tree().has_child("A", "B"));
        assert!(s.reply_tree().has_child("B", "C"));
        assert!(s.orphan_tree(ScanDirection::Backward).is_empty());
    }

    #[test]
    fn test_reply_to_orphan_is_orphaned() {
        let mut s = state();
        merge(&mut s, &candidate("B", "A", 20), ScanDirection::Forward);
        merge(&mut s, &candidate("C", "B", 30), ScanDirection::Forward);
        assert!(s.post("C").unwrap().orphaned);
        assert!(s.orphan_tree(ScanDirection::Forward).has_child("B", "C"));
    }

    #[test]
    fn test_comment_waits_for_discussed_post() {
        let mut s = state();
        merge(&mut s, &comment("K", "R", 50), ScanDirection::Backward);
        assert!(s.post("K").unwrap().orphaned);
        assert!(s.channel("discuss:R").unwrap().orphaned);

        merge(&mut s, &candidate("R", "", 40), ScanDirection::Backward);
        assert!(!s.post("K").unwrap().orphaned);
        assert!(!s.channel("discuss:R").unwrap().orphaned);
        assert!(s.reply_tree().has_child("discuss:R", "K"));
    }

    #[test]
    fn test_comment_placeholder_refreshed_against_state() {
        let mut s = state();
        merge(&mut s, &candidate("R", "", 40), ScanDirection::Forward);
        // The decoder saw R as absent, the graph knows better.
        let delta = merge(&mut s, &comment("K", "R", 50), ScanDirection::Forward);
        assert_eq!(delta.channel.map(|c| c.orphaned), Some(false));
        assert!(s.reply_tree().has_child("discuss:R", "K"));
    }

    #[test]
    fn test_cascade_reaches_comments_of_promoted_reply() {
        let mut s = state();
        merge(&mut s, &comment("K", "R", 50), ScanDirection::Forward);
        merge(&mut s, &candidate("R", "P", 40), ScanDirection::Forward);
        assert!(s.post("K").unwrap().orphaned);

        merge(&mut s, &candidate("P", "", 30), ScanDirection::Forward);
        assert!(!s.post("R").unwrap().orphaned);
        assert!(!s.post("K").unwrap().orphaned);
        assert!(s.reply_tree().has_child("discuss:R", "K"));
    }

    #[test]
    fn test_new_poster_only_once() {
        let mut s = state();
        let mut c = candidate("A", "", 1);
        c.new_poster = Some(Poster::unknown("0xa"));
        let delta = merge(&mut s, &c, ScanDirection::Forward);
        assert!(delta.new_poster.is_some());

        let mut c2 = candidate("B", "", 2);
        c2.new_poster = Some(Poster::unknown("0xa"));
        assert!(reconcile(&s, &c2, ScanDirection::Forward).new_poster.is_none());
    }
}
