// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Tree: a generational widget-tree arena with batched change observation.
//!
//! Composite widgets (flows, accordions, dropdowns, tab strips) keep needing the
//! same substrate: a live tree of elements that a parent can inspect to find its
//! logical children, mutate cheaply, and *watch* for structural change. This
//! crate provides that substrate as an explicit arena — no real document tree,
//! no rendering framework — so the coordination logic built on top of it stays
//! fully testable in plain unit tests.
//!
//! - [`Tree`]: slot/generation arena holding one [`NodeData`] per node, with an
//!   ordered child vector per parent. Child-vector order *is* document order.
//! - [`NodeId`]: small copyable generational handle. Stale handles are absorbed:
//!   accessors return `None`/empty and mutators are no-ops, never panics.
//! - [`Churn`]: the batched summary of structural edits returned by
//!   [`Tree::commit`]. Any number of inserts/removes/reorders between two
//!   commits collapse into exactly one `Churn`.
//! - [`Watches`]: a subscription registry kept *outside* the tree. After each
//!   commit, [`Watches::notify`] fires each subscription at most once if the
//!   churn touched that subscription's subtree. Watching a detached root is a
//!   no-op until it is observed again.
//!
//! Configuration writes ([`Tree::set_config`]) are deliberately not journaled:
//! a parent projecting state onto its children must not re-trigger the very
//! observation that started the projection.
//!
//! ## Minimal example
//!
//! ```rust
//! use trellis_tree::{NodeData, Tag, Tree, Watches};
//!
//! const FLOW: Tag = Tag(1);
//! const FLOW_ITEM: Tag = Tag(2);
//!
//! let mut tree = Tree::new();
//! let mut watches = Watches::new();
//!
//! let flow = tree.insert(None, NodeData::new(FLOW));
//! let watch = watches.observe(flow);
//!
//! // Several synchronous edits...
//! let a = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
//! let b = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
//! tree.reorder(b, 0);
//!
//! // ...collapse into a single churn and a single firing.
//! let churn = tree.commit();
//! let mut fired = 0;
//! watches.notify(&tree, &churn, |id, root| {
//!     assert_eq!(id, watch);
//!     assert_eq!(root, flow);
//!     fired += 1;
//! });
//! assert_eq!(fired, 1);
//! assert_eq!(tree.children_of(flow), &[b, a]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod churn;
mod tree;
mod types;
mod watch;

pub use churn::Churn;
pub use tree::Tree;
pub use types::{ChildConfig, NodeData, NodeId, RoleFlags, Tag};
pub use watch::{WatchId, Watches};
