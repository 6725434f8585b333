//! # Ordinal Trees
//!
//! Parent → children adjacency where every child occupies a dense ordinal
//! slot `"<parent>-<index>"`. The reply tree, both orphan trees and the
//! de-orphaned tree share this shape.
//!
//! Slots are never removed. Orphan trees clear a slot to `None` when its
//! child is promoted, so indices stay contiguous from 0.

use std::collections::{BTreeMap, HashMap};

use shared_types::PostId;

/// One ordinal slot written by a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSlot {
    /// Parent post id or discussion channel id.
    pub parent: String,
    /// Ordinal index under `parent`.
    pub index: usize,
    /// Occupant, `None` for a cleared slot.
    pub child: Option<PostId>,
}

impl TreeSlot {
    /// Slot holding `child`.
    pub fn occupied(parent: impl Into<String>, index: usize, child: impl Into<PostId>) -> Self {
        Self {
            parent: parent.into(),
            index,
            child: Some(child.into()),
        }
    }

    /// Cleared slot.
    pub fn cleared(parent: impl Into<String>, index: usize) -> Self {
        Self {
            parent: parent.into(),
            index,
            child: None,
        }
    }

    /// Ordinal key, e.g. `"42-0"`.
    pub fn key(&self) -> String {
        ordinal_key(&self.parent, self.index)
    }
}

/// Ordinal key of slot `index` under `parent`.
pub fn ordinal_key(parent: &str, index: usize) -> String {
    format!("{parent}-{index}")
}

/// Ordered list of child slots per parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdinalTree {
    slots: HashMap<String, Vec<Option<PostId>>>,
}

impl OrdinalTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next appended child of `parent` would take.
    pub fn next_index(&self, parent: &str) -> usize {
        self.slots.get(parent).map_or(0, Vec::len)
    }

    /// Append `child` under `parent`, returning its ordinal.
    pub fn append(&mut self, parent: &str, child: PostId) -> usize {
        let list = self.slots.entry(parent.to_string()).or_default();
        list.push(Some(child));
        list.len() - 1
    }

    /// Write a slot, growing the list with empty slots when needed.
    pub fn write(&mut self, slot: &TreeSlot) {
        let list = self.slots.entry(slot.parent.clone()).or_default();
        if list.len() <= slot.index {
            list.resize(slot.index + 1, None);
        }
        list[slot.index] = slot.child.clone();
    }

    /// Occupied slots of `parent` as `(index, child)`, in ordinal order.
    pub fn occupied(&self, parent: &str) -> Vec<(usize, PostId)> {
        self.slots
            .get(parent)
            .map(|list| {
                list.iter()
                    .enumerate()
                    .filter_map(|(i, child)| child.clone().map(|c| (i, c)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Children of `parent`, in ordinal order.
    pub fn children(&self, parent: &str) -> Vec<PostId> {
        self.occupied(parent).into_iter().map(|(_, c)| c).collect()
    }

    /// Raw slots of `parent`, cleared ones included.
    pub fn slots(&self, parent: &str) -> &[Option<PostId>] {
        self.slots.get(parent).map_or(&[], Vec::as_slice)
    }

    /// Whether `child` occupies any slot under `parent`.
    pub fn has_child(&self, parent: &str, child: &str) -> bool {
        self.slots(parent)
            .iter()
            .any(|slot| slot.as_deref() == Some(child))
    }

    /// All parents that ever had a slot.
    pub fn parents(&self) -> impl Iterator<Item = &String> {
        self.slots.keys()
    }

    /// Every occupied `(parent, child)` edge.
    pub fn edges(&self) -> Vec<(String, PostId)> {
        self.slots
            .iter()
            .flat_map(|(parent, list)| {
                list.iter()
                    .flatten()
                    .map(move |child| (parent.clone(), child.clone()))
            })
            .collect()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.values().flatten().filter(|s| s.is_some()).count()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupied slots keyed `"<parent>-<index>"`, as the presentation layer
    /// reads them. Cleared slots are omitted.
    pub fn to_keyed_map(&self) -> BTreeMap<String, PostId> {
        self.slots
            .iter()
            .flat_map(|(parent, list)| {
                list.iter().enumerate().filter_map(move |(i, child)| {
                    child.as_ref().map(|c| (ordinal_key(parent, i), c.clone()))
                })
            })
            .collect()
    }
}
