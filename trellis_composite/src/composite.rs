// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The parent's reactive state and the projection step.

use alloc::vec::Vec;
use hashbrown::HashSet;

use trellis_tree::{ChildConfig, Churn, NodeId, RoleFlags, Tag, Tree};

use crate::discover::discover;
use crate::roles::{self, Activation, SelectionMode, Transition};

/// Coarse parent state, determined solely by the current child count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No logical children.
    Empty,
    /// Exactly one logical child.
    Single,
    /// Two or more logical children; back controls and transition direction
    /// only mean anything here.
    Multiple,
}

/// Outcome of one projection cycle.
#[derive(Copy, Clone, Debug)]
pub struct Projection {
    /// Whether any child configuration was actually written.
    pub changed: bool,
    /// The active child, after resolution (single-active mode).
    pub active: Option<NodeId>,
    /// The active child's position, after resolution (single-active mode).
    pub active_index: Option<usize>,
    /// Direction of the child-count transition this cycle observed.
    pub direction: Transition,
}

/// A composite parent: owns selection state and projects roles onto the
/// logical children it discovers in the tree.
///
/// The child list is derived, never authoritative: every call to
/// [`Composite::project`] re-discovers it from the live tree and recomputes
/// every position from scratch, so arbitrary insert/remove/reorder cannot make
/// derived state drift. Selection is stored by [`NodeId`] identity for the
/// same reason.
///
/// Projection is idempotent: a second call with no intervening structural
/// mutation writes nothing and reports `changed == false`.
#[derive(Debug)]
pub struct Composite {
    root: NodeId,
    child_tag: Tag,
    parent_tag: Tag,
    mode: SelectionMode,
    closable: bool,
    /// Explicitly chosen child (single-active mode). `None` means "default":
    /// the most recently added child wins at every resolution, so later
    /// inserts steal activation until a choice is made.
    selected: Option<NodeId>,
    /// Resolved active child from the last projection cycle.
    active: Option<NodeId>,
    /// Independently active children (multi-active mode).
    multi_active: HashSet<NodeId>,
    children: Vec<NodeId>,
    active_index: Option<usize>,
    direction: Transition,
}

impl Composite {
    /// Create a composite rooted at `root`, discovering children tagged
    /// `child_tag` and treating `parent_tag` as the nesting boundary.
    ///
    /// State is created on attach: run [`Composite::project`] once right away
    /// for the initial discovery cycle.
    pub fn new(root: NodeId, child_tag: Tag, parent_tag: Tag, mode: SelectionMode) -> Self {
        Self {
            root,
            child_tag,
            parent_tag,
            mode,
            closable: false,
            selected: None,
            active: None,
            multi_active: HashSet::new(),
            children: Vec::new(),
            active_index: None,
            direction: Transition::None,
        }
    }

    /// Mark every child closable (adds `CLOSABLE` to projected flags).
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// The parent node this composite coordinates.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The child list from the last projection cycle.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The current topmost (highest position) logical child, resolved from
    /// the live tree.
    ///
    /// Unlike [`Composite::children`], this does not rely on the last
    /// projection cycle: children inserted since then count.
    pub fn topmost(&self, tree: &Tree) -> Option<NodeId> {
        discover(tree, self.root, self.child_tag, self.parent_tag).pop()
    }

    /// The resolved active child from the last projection cycle.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// The resolved active position from the last projection cycle.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Direction of the last observed child-count transition.
    pub fn direction(&self) -> Transition {
        self.direction
    }

    /// Coarse state from the current child count.
    pub fn phase(&self) -> Phase {
        match self.children.len() {
            0 => Phase::Empty,
            1 => Phase::Single,
            _ => Phase::Multiple,
        }
    }

    /// Choose the active child (single-active mode). `None` restores the
    /// default most-recently-added resolution.
    ///
    /// Host-initiated selection is identical to a child's `Select` request:
    /// it takes effect on the next [`Composite::project`].
    pub fn set_active(&mut self, child: Option<NodeId>) {
        self.selected = child;
    }

    /// Choose the active child by its current position (single-active mode).
    /// Out-of-range indices restore the default resolution.
    pub fn set_active_index(&mut self, index: usize) {
        self.selected = self.children.get(index).copied();
    }

    /// Toggle a child's membership in the active set (multi-active mode).
    pub fn toggle_active(&mut self, child: NodeId) {
        if !self.multi_active.remove(&child) {
            self.multi_active.insert(child);
        }
    }

    /// Project only when `churn` touched this composite's subtree.
    pub fn sync(&mut self, tree: &mut Tree, churn: &Churn) -> Option<Projection> {
        churn.affects(tree, self.root).then(|| self.project(tree))
    }

    /// Run one discovery cycle: discover children, resolve selection, assign
    /// roles, and apply only the changed configurations.
    pub fn project(&mut self, tree: &mut Tree) -> Projection {
        let found = discover(tree, self.root, self.child_tag, self.parent_tag);
        let prev_len = self.children.len();
        let prev_active = self.active;

        // Departed children cannot stay selected.
        match self.mode {
            SelectionMode::SingleActive => {
                if self.selected.is_some_and(|n| !found.contains(&n)) {
                    self.selected = None;
                }
            }
            SelectionMode::MultiActive => {
                self.multi_active.retain(|n| found.contains(n));
            }
        }

        // Resolve the active position. Without an explicit choice the last
        // child wins: most-recently-added, matching flow/stack semantics.
        let active_index = match self.mode {
            SelectionMode::SingleActive => {
                if found.is_empty() {
                    None
                } else {
                    Some(
                        self.selected
                            .and_then(|n| found.iter().position(|&c| c == n))
                            .unwrap_or(found.len() - 1),
                    )
                }
            }
            SelectionMode::MultiActive => None,
        };
        self.active = active_index.map(|i| found[i]);

        let has_active = match self.mode {
            SelectionMode::SingleActive => active_index.is_some(),
            SelectionMode::MultiActive => !self.multi_active.is_empty(),
        };
        // An unchanged child list keeps the last observed transition, so
        // re-projection stays free of observable effects.
        let direction = if found == self.children {
            self.direction
        } else {
            roles::direction(prev_len, found.len(), has_active)
        };

        // When the active child changes, its immediate predecessor loses any
        // transient expanded sub-state.
        let collapse = if self.mode == SelectionMode::SingleActive && self.active != prev_active {
            active_index.and_then(roles::collapse_target)
        } else {
            None
        };

        let multi: Vec<bool> = match self.mode {
            SelectionMode::SingleActive => Vec::new(),
            SelectionMode::MultiActive => found
                .iter()
                .map(|n| self.multi_active.contains(n))
                .collect(),
        };
        let activation = match self.mode {
            SelectionMode::SingleActive => Activation::Single(active_index),
            SelectionMode::MultiActive => Activation::Multi(&multi),
        };
        let assigned = roles::assign(found.len(), &activation, self.closable);

        let mut changed = false;
        for (i, (&child, &role)) in found.iter().zip(assigned.iter()).enumerate() {
            let Some(old) = tree.config(child) else {
                continue;
            };
            let mut flags = role;
            if old.flags.contains(RoleFlags::EXPANDED) && collapse != Some(i) {
                flags |= RoleFlags::EXPANDED;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Positions are bounded by the 32-bit node index space."
            )]
            let config = ChildConfig {
                position: i as u32,
                flags,
            };
            if config != old {
                tree.set_config(child, config);
                changed = true;
            }
        }

        self.children = found;
        self.active_index = active_index;
        self.direction = direction;

        Projection {
            changed,
            active: self.active,
            active_index,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::NodeData;

    const FLOW: Tag = Tag(1);
    const FLOW_ITEM: Tag = Tag(2);

    fn flow(tree: &mut Tree) -> (NodeId, Composite) {
        let root = tree.insert(None, NodeData::new(FLOW));
        let composite = Composite::new(root, FLOW_ITEM, FLOW, SelectionMode::SingleActive);
        (root, composite)
    }

    fn positions(tree: &Tree, children: &[NodeId]) -> Vec<u32> {
        children
            .iter()
            .map(|&c| tree.config(c).unwrap().position)
            .collect()
    }

    #[test]
    fn positions_are_contiguous_after_arbitrary_edits() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let c = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(positions(&tree, composite.children()), &[0, 1, 2]);

        tree.remove(b);
        tree.reorder(c, 0);
        let d = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.children(), &[c, a, d]);
        assert_eq!(positions(&tree, composite.children()), &[0, 1, 2]);
    }

    #[test]
    fn single_mode_has_exactly_one_active() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        composite.project(&mut tree);
        assert_eq!(composite.active_index(), None);
        assert_eq!(composite.phase(), Phase::Empty);

        for _ in 0..4 {
            let _ = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
            composite.project(&mut tree);
            let active = composite
                .children()
                .iter()
                .filter(|&&c| tree.config(c).unwrap().flags.contains(RoleFlags::ACTIVE))
                .count();
            assert_eq!(active, 1, "exactly one active child whenever n >= 1");
        }
        assert_eq!(composite.phase(), Phase::Multiple);
    }

    #[test]
    fn most_recently_added_wins_by_default() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.active(), Some(a));
        assert!(
            !tree
                .config(a)
                .unwrap()
                .flags
                .contains(RoleFlags::SHOW_BACK),
            "a sole child has nowhere to go back to"
        );

        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.active(), Some(b));
        assert_eq!(composite.direction(), Transition::Advancing);
        assert!(!tree.config(a).unwrap().flags.contains(RoleFlags::VISIBLE));
        assert!(tree.config(b).unwrap().flags.contains(RoleFlags::SHOW_BACK));
    }

    #[test]
    fn explicit_selection_sticks_across_inserts() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let _b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);

        composite.set_active(Some(a));
        composite.project(&mut tree);
        assert_eq!(composite.active_index(), Some(0));

        // New inserts do not steal an explicit selection.
        let _c = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.active(), Some(a));
    }

    #[test]
    fn removing_the_active_child_falls_back_to_last() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.active(), Some(b));

        tree.remove(b);
        let projection = composite.project(&mut tree);
        assert_eq!(projection.active, Some(a));
        assert_eq!(projection.direction, Transition::Retreating);
        assert!(tree.config(a).unwrap().flags.contains(RoleFlags::ACTIVE));
    }

    #[test]
    fn projection_is_idempotent() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let _ = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let _ = tree.insert(Some(root), NodeData::new(FLOW_ITEM));

        let first = composite.project(&mut tree);
        assert!(first.changed);
        let before: Vec<_> = composite
            .children()
            .iter()
            .map(|&c| tree.config(c).unwrap())
            .collect();

        let second = composite.project(&mut tree);
        assert!(!second.changed, "no writes without intervening mutation");
        let after: Vec<_> = composite
            .children()
            .iter()
            .map(|&c| tree.config(c).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn direction_survives_idempotent_reprojection() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let _a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        let _b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.direction(), Transition::Advancing);

        let again = composite.project(&mut tree);
        assert!(!again.changed);
        assert_eq!(again.direction, Transition::Advancing);
        assert_eq!(composite.direction(), Transition::Advancing);
    }

    #[test]
    fn predecessor_expansion_collapses_on_advance() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);

        // The child opens a disclosure while active.
        let mut config = tree.config(a).unwrap();
        config.flags |= RoleFlags::EXPANDED;
        tree.set_config(a, config);

        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert_eq!(composite.active(), Some(b));
        assert!(
            !tree.config(a).unwrap().flags.contains(RoleFlags::EXPANDED),
            "stale expansion must not survive the transition"
        );
    }

    #[test]
    fn expansion_survives_projection_without_active_change() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);

        let mut config = tree.config(b).unwrap();
        config.flags |= RoleFlags::EXPANDED;
        tree.set_config(b, config);

        // Unrelated churn: `a` is neither active nor the collapse target.
        let _c = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.set_active(Some(b));
        composite.project(&mut tree);
        assert!(tree.config(b).unwrap().flags.contains(RoleFlags::EXPANDED));
    }

    #[test]
    fn multi_mode_children_stay_visible_and_toggle() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeData::new(FLOW));
        let mut composite = Composite::new(root, FLOW_ITEM, FLOW, SelectionMode::MultiActive);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let b = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);

        assert!(tree.config(a).unwrap().flags.contains(RoleFlags::VISIBLE));
        assert!(tree.config(b).unwrap().flags.contains(RoleFlags::VISIBLE));
        assert!(!tree.config(a).unwrap().flags.contains(RoleFlags::ACTIVE));

        composite.toggle_active(a);
        composite.toggle_active(b);
        composite.project(&mut tree);
        assert!(tree.config(a).unwrap().flags.contains(RoleFlags::ACTIVE));
        assert!(tree.config(b).unwrap().flags.contains(RoleFlags::ACTIVE));

        composite.toggle_active(a);
        composite.project(&mut tree);
        assert!(!tree.config(a).unwrap().flags.contains(RoleFlags::ACTIVE));
        assert!(tree.config(b).unwrap().flags.contains(RoleFlags::ACTIVE));
    }

    #[test]
    fn sync_projects_only_on_affecting_churn() {
        let mut tree = Tree::new();
        let (root, mut composite) = flow(&mut tree);
        let other = tree.insert(None, NodeData::new(FLOW));
        let _ = tree.commit();

        let _ = tree.insert(Some(other), NodeData::new(FLOW_ITEM));
        let churn = tree.commit();
        assert!(composite.sync(&mut tree, &churn).is_none());

        let _ = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        let churn = tree.commit();
        let projection = composite.sync(&mut tree, &churn).unwrap();
        assert!(projection.changed);
    }

    #[test]
    fn closable_policy_reaches_children() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeData::new(FLOW));
        let mut composite =
            Composite::new(root, FLOW_ITEM, FLOW, SelectionMode::SingleActive).closable(true);
        let a = tree.insert(Some(root), NodeData::new(FLOW_ITEM));
        composite.project(&mut tree);
        assert!(tree.config(a).unwrap().flags.contains(RoleFlags::CLOSABLE));
    }
}
