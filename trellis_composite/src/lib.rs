// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Composite: the parent/child coordination protocol composite widgets
//! keep reimplementing, extracted once.
//!
//! A composite widget (flow + flow-item, accordion + accordion-item, dropdown +
//! dropdown-item, tile group + tile) does not receive its children as data: it
//! *discovers* them from the live tree, reacts when they come and go, pushes
//! computed role state down onto each one, and receives interaction requests
//! back up. This crate implements that protocol over
//! [`trellis_tree`]'s arena, with no rendering framework in sight:
//!
//! - [`discover`]: pure pruned tree walk producing the ordered logical children
//!   of a parent, with nesting exclusion (a nested composite of the same kind
//!   never leaks its children upward).
//! - [`roles`]: pure role assignment — which child is active, visible, shows a
//!   back control — plus transition direction and the collapse rule.
//! - [`Composite`]: the parent's reactive state and the projection step that
//!   applies assigned roles onto each child's configuration surface, writing
//!   only what changed. Projection is idempotent.
//! - [`Bridge`]: the upward channel. Children hold a [`Sender`] capability and
//!   post [`Request`]s; the bridge turns them into selection changes and
//!   (optionally hook-gated) removals, and emits [`Notification`]s outward.
//!
//! ## A flow in a few lines
//!
//! ```rust
//! use trellis_composite::{Bridge, Composite, Request, SelectionMode};
//! use trellis_tree::{NodeData, RoleFlags, Tag, Tree};
//!
//! const FLOW: Tag = Tag(1);
//! const FLOW_ITEM: Tag = Tag(2);
//!
//! let mut tree = Tree::new();
//! let flow = tree.insert(None, NodeData::new(FLOW));
//! let mut composite = Composite::new(flow, FLOW_ITEM, FLOW, SelectionMode::SingleActive);
//! let mut bridge = Bridge::new();
//!
//! // Two panels pushed onto the flow; the most recent one becomes active.
//! let a = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
//! let b = tree.insert(Some(flow), NodeData::new(FLOW_ITEM));
//! let _ = tree.commit();
//! composite.project(&mut tree);
//!
//! assert!(tree.config(b).unwrap().flags.contains(RoleFlags::ACTIVE));
//! assert!(!tree.config(a).unwrap().flags.contains(RoleFlags::VISIBLE));
//!
//! // The active panel requests back-navigation; the previous one takes over.
//! bridge.sender().send(Request::Back);
//! bridge.step(&mut composite, &mut tree);
//! assert!(!tree.is_alive(b));
//! assert!(tree.config(a).unwrap().flags.contains(RoleFlags::ACTIVE));
//! ```
//!
//! Everything here is single-threaded and cooperative: the tree, composite,
//! and bridge are exclusively borrowed per step, so no two projection cycles
//! for the same parent can ever overlap. The only thing that waits is an
//! optional pre-removal gate (see [`bridge`]); everything else is synchronous.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod bridge;
pub mod composite;
pub mod discover;
pub mod roles;

pub use bridge::{
    Bridge, HookGate, HookSignal, HookState, Notification, Postbox, Request, Sender, hook_gate,
};
pub use composite::{Composite, Phase, Projection};
pub use discover::discover;
pub use roles::{SelectionMode, Transition};
