// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child discovery: a pure pruned walk over the live tree.

use alloc::vec::Vec;

use trellis_tree::{NodeId, Tag, Tree};

/// Collect the ordered logical children of `parent`.
///
/// Walks `parent`'s subtree depth-first in document order, collecting every
/// node tagged `child_tag`. Any node tagged `parent_tag` other than `parent`
/// itself marks a nested composite of the same kind: its subtree is pruned,
/// not descended into, so nested instances never leak children upward.
/// Matched children *are* descended into — their content may legitimately
/// hold further direct children of `parent` — but a nested parent boundary
/// inside them still prunes.
///
/// Zero matches yield an empty vector. A stale `parent` handle yields an
/// empty vector. This function is pure: it never touches node state.
pub fn discover(tree: &Tree, parent: NodeId, child_tag: Tag, parent_tag: Tag) -> Vec<NodeId> {
    let mut out = Vec::new();
    if !tree.is_alive(parent) {
        return out;
    }

    // Explicit stack, children pushed in reverse so they pop in document order.
    let mut stack: Vec<NodeId> = Vec::new();
    stack.extend(tree.children_of(parent).iter().rev());

    while let Some(id) = stack.pop() {
        let Some(tag) = tree.tag(id) else { continue };
        if tag == parent_tag {
            // Nesting exclusion: a same-kind composite owns everything below it.
            continue;
        }
        if tag == child_tag {
            out.push(id);
        }
        stack.extend(tree.children_of(id).iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::NodeData;

    const ACCORDION: Tag = Tag(10);
    const ACCORDION_ITEM: Tag = Tag(11);
    const DIV: Tag = Tag(99);

    #[test]
    fn empty_parent_yields_empty_sequence() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, NodeData::new(ACCORDION));
        assert!(discover(&tree, parent, ACCORDION_ITEM, ACCORDION).is_empty());
    }

    #[test]
    fn collects_in_document_order_through_wrappers() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, NodeData::new(ACCORDION));
        let a = tree.insert(Some(parent), NodeData::new(ACCORDION_ITEM));
        // A child hidden inside intermediate markup still counts.
        let wrapper = tree.insert(Some(parent), NodeData::new(DIV));
        let b = tree.insert(Some(wrapper), NodeData::new(ACCORDION_ITEM));
        let c = tree.insert(Some(parent), NodeData::new(ACCORDION_ITEM));

        assert_eq!(
            discover(&tree, parent, ACCORDION_ITEM, ACCORDION),
            &[a, b, c]
        );
    }

    #[test]
    fn nested_same_kind_parent_is_pruned() {
        let mut tree = Tree::new();
        let outer = tree.insert(None, NodeData::new(ACCORDION));
        let direct = tree.insert(Some(outer), NodeData::new(ACCORDION_ITEM));

        // A nested accordion inside the direct child, with its own items.
        let nested = tree.insert(Some(direct), NodeData::new(ACCORDION));
        let _nested_item = tree.insert(Some(nested), NodeData::new(ACCORDION_ITEM));

        assert_eq!(
            discover(&tree, outer, ACCORDION_ITEM, ACCORDION),
            &[direct],
            "nested instance children must not leak upward"
        );
        // The nested instance still sees its own child.
        assert_eq!(
            discover(&tree, nested, ACCORDION_ITEM, ACCORDION).len(),
            1
        );
    }

    #[test]
    fn children_inside_matched_children_are_found() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, NodeData::new(ACCORDION));
        let a = tree.insert(Some(parent), NodeData::new(ACCORDION_ITEM));
        // An item nested inside another item (no same-kind boundary between).
        let b = tree.insert(Some(a), NodeData::new(ACCORDION_ITEM));

        assert_eq!(discover(&tree, parent, ACCORDION_ITEM, ACCORDION), &[a, b]);
    }

    #[test]
    fn stale_parent_yields_empty_sequence() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, NodeData::new(ACCORDION));
        let _ = tree.insert(Some(parent), NodeData::new(ACCORDION_ITEM));
        tree.remove(parent);
        assert!(discover(&tree, parent, ACCORDION_ITEM, ACCORDION).is_empty());
    }
}
