// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The upward channel: child interaction requests, hook-gated removal, and
//! outward notifications.
//!
//! Children do not reach into parent state. Each child side holds a cloned
//! [`Sender`] capability and posts typed [`Request`]s; the owning parent's
//! [`Bridge`] drains them in FIFO order, turns them into selection changes and
//! removals, and reports outcomes on a [`Notification`] queue the host drains.
//! This replaces bubbling custom events with message passing, so nothing here
//! depends on any particular tree's event semantics.
//!
//! ## Pre-removal gates
//!
//! A child may carry an optional pre-removal capability (an exit animation, a
//! confirmation step). The host registers it with
//! [`Bridge::set_removal_hook`]; presence of the registration *is* the
//! capability query. When such a child is dismissed, the hook runs and returns
//! the [`HookSignal`] half of a one-shot gate; the removal is deferred until
//! the host resolves the [`HookGate`] half. There is no timeout at this layer
//! — a gate that never resolves defers the removal forever, and callers who
//! need a deadline compose one outside. A failed gate aborts the removal: the
//! child stays, its flags untouched, and the failure surfaces as a
//! [`Notification::RemovalFailed`] — never as a panic across the projection
//! boundary.
//!
//! While a gate is pending, further dismiss requests for the same child are
//! absorbed (idempotent guard keyed by child identity).

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use hashbrown::HashMap;

use trellis_tree::{NodeId, Tree};

use crate::composite::Composite;
use crate::roles::{SelectionMode, Transition};

/// An interaction request a child sends up to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// The child asks to become (or in multi mode, toggle being) active.
    Select(NodeId),
    /// The child asks to be removed.
    Dismiss(NodeId),
    /// The topmost child asks to navigate back (dismissing itself).
    Back,
}

/// State of a one-shot pre-removal gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HookState {
    /// Not yet resolved; the removal stays deferred.
    Pending,
    /// Resolved successfully; the removal may proceed.
    Done,
    /// Resolved with failure; the removal is aborted.
    Failed,
}

/// Read half of a pre-removal gate, returned by a hook.
#[derive(Clone, Debug)]
pub struct HookSignal(Rc<Cell<HookState>>);

impl HookSignal {
    /// Current gate state.
    pub fn state(&self) -> HookState {
        self.0.get()
    }
}

/// Write half of a pre-removal gate, held by whoever performs the deferred
/// work. Resolution is one-shot: once out of [`HookState::Pending`], further
/// calls are absorbed.
#[derive(Clone, Debug)]
pub struct HookGate(Rc<Cell<HookState>>);

impl HookGate {
    /// Mark the deferred work complete; the removal proceeds on the next pump.
    pub fn resolve(&self) {
        if self.0.get() == HookState::Pending {
            self.0.set(HookState::Done);
        }
    }

    /// Mark the deferred work failed; the removal is aborted on the next pump.
    pub fn fail(&self) {
        if self.0.get() == HookState::Pending {
            self.0.set(HookState::Failed);
        }
    }
}

/// Create the two halves of a fresh pre-removal gate.
pub fn hook_gate() -> (HookGate, HookSignal) {
    let cell = Rc::new(Cell::new(HookState::Pending));
    (HookGate(cell.clone()), HookSignal(cell))
}

/// The shared request queue between children and their parent's bridge.
#[derive(Debug, Default)]
pub struct Postbox {
    queue: Rc<RefCell<VecDeque<Request>>>,
}

impl Postbox {
    /// Create an empty postbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a send capability for a child side.
    pub fn sender(&self) -> Sender {
        Sender {
            queue: self.queue.clone(),
        }
    }

    fn drain(&self) -> Vec<Request> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// A child's capability to post requests upward. Cheap to clone; all clones
/// feed the same [`Postbox`].
#[derive(Clone, Debug)]
pub struct Sender {
    queue: Rc<RefCell<VecDeque<Request>>>,
}

impl Sender {
    /// Post a request. Delivery happens when the owning bridge next steps.
    pub fn send(&self, request: Request) {
        self.queue.borrow_mut().push_back(request);
    }
}

/// A consolidated outward notification for the host application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A projection cycle applied changes; carries the new active identity.
    SelectionChanged {
        /// Resolved active child, if any.
        active: Option<NodeId>,
        /// Resolved active position, if any.
        index: Option<usize>,
        /// Direction of the observed transition.
        direction: Transition,
    },
    /// A pre-removal gate failed; the child remains in place.
    RemovalFailed {
        /// The child whose removal was aborted.
        child: NodeId,
    },
}

type Hook = Box<dyn FnMut(NodeId) -> HookSignal>;

/// Translates child requests into state transitions and removals for one
/// composite parent.
pub struct Bridge {
    postbox: Postbox,
    hooks: HashMap<NodeId, Hook>,
    pending: HashMap<NodeId, HookSignal>,
    notifications: VecDeque<Notification>,
}

impl core::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bridge")
            .field("hooks", &self.hooks.len())
            .field("pending", &self.pending.len())
            .field("notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    /// Create a bridge with an empty postbox.
    pub fn new() -> Self {
        Self {
            postbox: Postbox::new(),
            hooks: HashMap::new(),
            pending: HashMap::new(),
            notifications: VecDeque::new(),
        }
    }

    /// Mint a send capability for a child side.
    pub fn sender(&self) -> Sender {
        self.postbox.sender()
    }

    /// Register a child's optional pre-removal capability.
    ///
    /// The hook runs once per accepted dismiss request and returns the signal
    /// half of a gate; see the module docs for the full protocol.
    pub fn set_removal_hook(
        &mut self,
        child: NodeId,
        hook: impl FnMut(NodeId) -> HookSignal + 'static,
    ) {
        self.hooks.insert(child, Box::new(hook));
    }

    /// Remove a child's pre-removal capability. A gate already pending for
    /// the child still runs to completion.
    pub fn clear_removal_hook(&mut self, child: NodeId) {
        self.hooks.remove(&child);
    }

    /// Returns `true` if a dismissal is currently deferred on a gate for
    /// `child`.
    pub fn is_removal_pending(&self, child: NodeId) -> bool {
        self.pending.contains_key(&child)
    }

    /// Drain queued requests, settle resolved gates, commit, and re-project.
    ///
    /// This is one full coordination cycle; it is safe to call at any time
    /// (projection is idempotent). Returns `true` if the cycle produced an
    /// observable change — a config write, or a new active identity (removing
    /// the last child writes nothing but flips the active to `None`) — in
    /// which case a [`Notification::SelectionChanged`] was queued.
    pub fn step(&mut self, composite: &mut Composite, tree: &mut Tree) -> bool {
        self.handle(composite, tree);
        self.pump(tree);
        let _ = tree.commit();
        let prev_active = composite.active();
        let projection = composite.project(tree);
        let notable = projection.changed || projection.active != prev_active;
        if notable {
            self.notifications.push_back(Notification::SelectionChanged {
                active: projection.active,
                index: projection.active_index,
                direction: projection.direction,
            });
        }
        notable
    }

    /// Drain and apply queued requests without projecting.
    pub fn handle(&mut self, composite: &mut Composite, tree: &mut Tree) {
        for request in self.postbox.drain() {
            match request {
                Request::Select(child) => match composite.mode() {
                    SelectionMode::SingleActive => composite.set_active(Some(child)),
                    SelectionMode::MultiActive => composite.toggle_active(child),
                },
                Request::Dismiss(child) => self.dismiss(child, tree),
                Request::Back => {
                    // Resolved against the live tree, not the cached child
                    // list: inserts since the last projection count.
                    if let Some(top) = composite.topmost(tree) {
                        self.dismiss(top, tree);
                    }
                }
            }
        }
    }

    /// Poll pending gates and settle any that resolved.
    pub fn pump(&mut self, tree: &mut Tree) {
        let settled: Vec<(NodeId, HookState)> = self
            .pending
            .iter()
            .map(|(&child, signal)| (child, signal.state()))
            .filter(|&(_, state)| state != HookState::Pending)
            .collect();
        for (child, state) in settled {
            self.pending.remove(&child);
            match state {
                HookState::Done => {
                    self.hooks.remove(&child);
                    tree.remove(child);
                }
                HookState::Failed => {
                    // Aborted: the child stays in place, flags untouched.
                    self.notifications
                        .push_back(Notification::RemovalFailed { child });
                }
                HookState::Pending => {}
            }
        }
    }

    /// Drain queued outward notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn dismiss(&mut self, child: NodeId, tree: &mut Tree) {
        if !tree.is_alive(child) || self.pending.contains_key(&child) {
            // Already gone or already awaiting a gate: absorbed.
            return;
        }
        match self.hooks.get_mut(&child) {
            Some(hook) => {
                let signal = hook(child);
                // The gate may have resolved synchronously.
                match signal.state() {
                    HookState::Done => {
                        self.hooks.remove(&child);
                        tree.remove(child);
                    }
                    HookState::Failed => {
                        self.notifications
                            .push_back(Notification::RemovalFailed { child });
                    }
                    HookState::Pending => {
                        self.pending.insert(child, signal);
                    }
                }
            }
            None => tree.remove(child),
        }
    }
}
