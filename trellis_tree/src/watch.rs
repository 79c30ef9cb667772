// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change observation: subscriptions fired once per commit.
//!
//! [`Watches`] lives *outside* [`Tree`] on purpose: the tree stays a plain
//! data structure, and the host decides when a commit's [`Churn`] is turned
//! into notifications. Because everything runs under `&mut` discipline on a
//! single thread, notification passes are naturally serialized — a firing can
//! never interleave with another firing or with an in-progress edit batch.

use alloc::vec::Vec;

use crate::churn::Churn;
use crate::tree::Tree;
use crate::types::NodeId;

/// Identifier for a subscription in a [`Watches`] registry (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WatchId(u32, u32);

/// Registry of subtree subscriptions.
///
/// Each subscription names a root node. After a [`Tree::commit`],
/// [`Watches::notify`] fires the sink at most once per subscription whose
/// subtree the churn touched. A subscription whose root has been removed is
/// silently skipped — observing a detached root is a no-op, never an error —
/// and fires again only if a new subscription is taken on a live root.
#[derive(Debug, Default)]
pub struct Watches {
    slots: Vec<Option<Watch>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

#[derive(Debug)]
struct Watch {
    generation: u32,
    root: NodeId,
}

impl Watches {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to structural changes within `root`'s subtree.
    pub fn observe(&mut self, root: NodeId) -> WatchId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Watch { generation, root });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "WatchId uses 32-bit indices by design."
            )]
            WatchId(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Watch { generation, root }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "WatchId uses 32-bit indices by design."
            )]
            WatchId((self.slots.len() - 1) as u32, generation)
        }
    }

    /// Release a subscription. Stale ids are absorbed.
    pub fn disconnect(&mut self, id: WatchId) {
        let idx = id.0 as usize;
        if let Some(slot) = self.slots.get_mut(idx)
            && slot.as_ref().is_some_and(|w| w.generation == id.1)
        {
            *slot = None;
            self.free_list.push(idx);
        }
    }

    /// Fire `sink` once for every live subscription whose subtree the churn
    /// touched.
    ///
    /// The batching guarantee comes from the commit boundary: however many
    /// edits went into the churn, each affected subscription fires exactly
    /// once per pass. No ordering is guaranteed between subscriptions.
    pub fn notify(&self, tree: &Tree, churn: &Churn, mut sink: impl FnMut(WatchId, NodeId)) {
        if churn.is_empty() {
            return;
        }
        for (idx, slot) in self.slots.iter().enumerate() {
            let Some(watch) = slot else { continue };
            if !tree.is_alive(watch.root) {
                // Detached root: skip until re-observed.
                continue;
            }
            if churn.affects(tree, watch.root) {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "WatchId uses 32-bit indices by design."
                )]
                sink(WatchId(idx as u32, watch.generation), watch.root);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeData, Tag};
    use alloc::vec;

    const PANEL: Tag = Tag(1);
    const ITEM: Tag = Tag(2);

    fn fired(watches: &Watches, tree: &Tree, churn: &Churn) -> Vec<WatchId> {
        let mut out = Vec::new();
        watches.notify(tree, churn, |id, _| out.push(id));
        out
    }

    #[test]
    fn burst_of_edits_fires_once() {
        let mut tree = Tree::new();
        let mut watches = Watches::new();
        let root = tree.insert(None, NodeData::new(PANEL));
        let watch = watches.observe(root);
        let _ = tree.commit();

        for _ in 0..5 {
            let _ = tree.insert(Some(root), NodeData::new(ITEM));
        }
        let churn = tree.commit();
        assert_eq!(fired(&watches, &tree, &churn), vec![watch]);

        // Quiet commit: nothing fires.
        let churn = tree.commit();
        assert!(fired(&watches, &tree, &churn).is_empty());
    }

    #[test]
    fn unrelated_subtrees_do_not_fire() {
        let mut tree = Tree::new();
        let mut watches = Watches::new();
        let a = tree.insert(None, NodeData::new(PANEL));
        let b = tree.insert(None, NodeData::new(PANEL));
        let watch_a = watches.observe(a);
        let _watch_b = watches.observe(b);
        let _ = tree.commit();

        let _ = tree.insert(Some(a), NodeData::new(ITEM));
        let churn = tree.commit();
        assert_eq!(fired(&watches, &tree, &churn), vec![watch_a]);
    }

    #[test]
    fn detached_root_is_skipped() {
        let mut tree = Tree::new();
        let mut watches = Watches::new();
        let outer = tree.insert(None, NodeData::new(PANEL));
        let inner = tree.insert(Some(outer), NodeData::new(PANEL));
        let _watch = watches.observe(inner);
        let _ = tree.commit();

        tree.remove(inner);
        let churn = tree.commit();
        // The churn touches `outer`, but the watch root is gone.
        assert!(fired(&watches, &tree, &churn).is_empty());
    }

    #[test]
    fn disconnect_releases_and_absorbs_stale_ids() {
        let mut tree = Tree::new();
        let mut watches = Watches::new();
        let root = tree.insert(None, NodeData::new(PANEL));
        let watch = watches.observe(root);
        let _ = tree.commit();

        watches.disconnect(watch);
        watches.disconnect(watch); // absorbed

        let _ = tree.insert(Some(root), NodeData::new(ITEM));
        let churn = tree.commit();
        assert!(fired(&watches, &tree, &churn).is_empty());

        // Slot reuse bumps the generation, so the old id stays stale.
        let watch2 = watches.observe(root);
        assert_ne!(watch, watch2);
    }
}
