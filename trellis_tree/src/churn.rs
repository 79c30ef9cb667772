// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched structural-change summary returned from commit.

use alloc::vec::Vec;

use crate::tree::Tree;
use crate::types::NodeId;

/// A batched set of structural changes derived from [`Tree::commit`].
///
/// `touched` holds the surviving attachment points: each parent whose child
/// vector changed since the previous commit (deduplicated, in first-touch
/// order), or a node itself when it was inserted as a root.
#[derive(Clone, Debug, Default)]
pub struct Churn {
    /// Live attachment points touched by the batch.
    pub touched: Vec<NodeId>,
}

impl Churn {
    /// Returns `true` if the batch contained no structural edits.
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Returns `true` if any touched node is `root` or a live descendant of
    /// `root`.
    pub fn affects(&self, tree: &Tree, root: NodeId) -> bool {
        self.touched.iter().any(|&t| tree.contains(root, t))
    }
}
