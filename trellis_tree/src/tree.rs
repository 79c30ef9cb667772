// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core arena implementation: structure, edits, the structural journal.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::churn::Churn;
use crate::types::{ChildConfig, NodeData, NodeId, Tag};

/// A live widget tree stored as a generational arena.
///
/// Each node has at most one parent and an ordered child vector; child-vector
/// order is document order. Structural edits (insert/remove/reorder) are
/// recorded in a journal and summarized by the next [`Tree::commit`] as a
/// [`Churn`]; configuration writes via [`Tree::set_config`] are not journaled.
///
/// ## Example
///
/// ```rust
/// use trellis_tree::{NodeData, Tag, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(None, NodeData::new(Tag(1)));
/// let child = tree.insert(Some(root), NodeData::new(Tag(2)));
///
/// assert_eq!(tree.children_of(root), &[child]);
/// assert_eq!(tree.parent_of(child), Some(root));
///
/// let churn = tree.commit();
/// assert!(!churn.is_empty());
/// ```
#[derive(Default)]
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Attachment points touched since the last commit.
    journal: Vec<NodeId>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("journal", &self.journal.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    data: NodeData,
}

impl Node {
    fn new(generation: u32, data: NodeData) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            data,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns `true` if the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.is_none())
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    ///
    /// The returned [`NodeId`] is live immediately; the structural change is
    /// reported by the next [`Tree::commit`].
    pub fn insert(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = self.alloc(data);
        match parent {
            Some(p) if self.is_alive(p) => {
                self.link_parent(id, p, None);
                self.journal.push(p);
            }
            _ => {
                // New root (or stale parent handle): the node itself is the
                // attachment point.
                self.journal.push(id);
            }
        }
        id
    }

    /// Insert a new node as a child of `parent`, immediately before `before`.
    ///
    /// Falls back to appending when `before` is stale or not a child of
    /// `parent`.
    pub fn insert_before(&mut self, parent: NodeId, before: NodeId, data: NodeData) -> NodeId {
        if !self.is_alive(parent) {
            return self.insert(None, data);
        }
        let at = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == before);
        let id = self.alloc(data);
        self.link_parent(id, parent, at);
        self.journal.push(parent);
        id
    }

    /// Remove a node and its entire subtree.
    ///
    /// Stale handles are a no-op. The detachment is reported by the next
    /// [`Tree::commit`] against the surviving parent (nothing is reported for
    /// a removed root: a watch on it is skipped as detached anyway).
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
            self.journal.push(parent);
        }
        self.free_subtree(id);
    }

    /// Move a node to `new_index` within its sibling vector (clamped).
    ///
    /// No-op for stale handles, roots, and moves that land on the current
    /// index.
    pub fn reorder(&mut self, id: NodeId, new_index: usize) {
        if !self.is_alive(id) {
            return;
        }
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let siblings = &mut self.node_mut(parent).children;
        let Some(old) = siblings.iter().position(|&c| c == id) else {
            return;
        };
        let new_index = new_index.min(siblings.len() - 1);
        if new_index == old {
            return;
        }
        siblings.remove(old);
        siblings.insert(new_index, id);
        self.journal.push(parent);
    }

    /// Write a child's configuration surface, if it actually changed.
    ///
    /// Not journaled: projection must not re-trigger observation.
    pub fn set_config(&mut self, id: NodeId, config: ChildConfig) {
        if let Some(n) = self.node_opt_mut(id)
            && n.data.config != config
        {
            n.data.config = config;
        }
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Returns the parent of a live node, or `None` for roots and stale handles.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// The ordered children of a node, or an empty slice for stale handles.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// The tag of a live node.
    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        self.node_opt(id).map(|n| n.data.tag)
    }

    /// The configuration surface of a live node.
    pub fn config(&self, id: NodeId) -> Option<ChildConfig> {
        self.node_opt(id).map(|n| n.data.config)
    }

    /// Returns `true` if `id` is `root` or a live descendant of `root`.
    pub fn contains(&self, root: NodeId, id: NodeId) -> bool {
        if !self.is_alive(root) || !self.is_alive(id) {
            return false;
        }
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == root {
                return true;
            }
            cur = self.parent_of(n);
        }
        false
    }

    /// Drain the structural journal into a batched [`Churn`].
    ///
    /// Edits made since the previous commit — however many — collapse into this
    /// one summary. Touched nodes that have since been removed are dropped;
    /// their own detachment was journaled against a surviving ancestor.
    pub fn commit(&mut self) -> Churn {
        let mut touched: Vec<NodeId> = Vec::with_capacity(self.journal.len());
        for id in self.journal.drain(..) {
            let alive = self
                .nodes
                .get(id.idx())
                .and_then(|n| n.as_ref())
                .is_some_and(|n| n.generation == id.1);
            if alive && !touched.contains(&id) {
                touched.push(id);
            }
        }
        Churn { touched }
    }

    // --- internals ---

    fn alloc(&mut self, data: NodeData) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            NodeId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            NodeId::new((self.nodes.len() - 1) as u32, generation)
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId, at: Option<usize>) {
        let children = &mut self.node_mut(parent).children;
        match at {
            Some(i) if i <= children.len() => children.insert(i, id),
            _ => children.push(id),
        }
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }
}
