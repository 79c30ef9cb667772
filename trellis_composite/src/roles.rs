// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Role assignment: pure functions from an ordered child view to per-child
//! role flags.
//!
//! Nothing in this module touches the tree. [`Composite::project`]
//! (see [`crate::composite`]) resolves its stored selection into an
//! [`Activation`] view, calls [`assign`], and applies the result.

use alloc::vec::Vec;

use trellis_tree::RoleFlags;

/// How a composite treats activation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// Exactly one child is active whenever any child exists; only the active
    /// child is visible (flow, tabs, dropdown).
    SingleActive,
    /// Children are independently active and all simultaneously visible
    /// (accordion in multi mode, tile groups).
    MultiActive,
}

/// Direction of the last child-count transition, for presentation only
/// (enter/exit animation choice); never consulted for correctness.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Transition {
    /// Child count grew while an active child exists.
    Advancing,
    /// Child count shrank.
    Retreating,
    /// No change, or nothing is active.
    #[default]
    None,
}

/// Resolved activation for one projection cycle.
#[derive(Clone, Debug)]
pub enum Activation<'a> {
    /// Single-active composites: the active position, if any children exist.
    Single(Option<usize>),
    /// Multi-active composites: per-position activation.
    Multi(&'a [bool]),
}

/// Compute role flags for `len` children under the given activation.
///
/// Single-active: the active child gets `ACTIVE | VISIBLE`, plus `SHOW_BACK`
/// when it has somewhere to go back to (`len > 1`); every other child gets
/// neither. Multi-active: every child is `VISIBLE`, `ACTIVE` independently,
/// and `SHOW_BACK` is never set.
///
/// `closable` adds `CLOSABLE` to every child; it is a composite-level policy,
/// not per-child state.
pub fn assign(len: usize, activation: &Activation<'_>, closable: bool) -> Vec<RoleFlags> {
    let base = if closable {
        RoleFlags::CLOSABLE
    } else {
        RoleFlags::empty()
    };
    (0..len)
        .map(|i| {
            let mut flags = base;
            match activation {
                Activation::Single(active) => {
                    if *active == Some(i) {
                        flags |= RoleFlags::ACTIVE | RoleFlags::VISIBLE;
                        if len > 1 {
                            flags |= RoleFlags::SHOW_BACK;
                        }
                    }
                }
                Activation::Multi(set) => {
                    flags |= RoleFlags::VISIBLE;
                    if set.get(i).copied().unwrap_or(false) {
                        flags |= RoleFlags::ACTIVE;
                    }
                }
            }
            flags
        })
        .collect()
}

/// Transition direction for a child-count change between two discovery cycles.
pub fn direction(old_len: usize, new_len: usize, has_active: bool) -> Transition {
    if new_len > old_len && has_active {
        Transition::Advancing
    } else if new_len < old_len {
        Transition::Retreating
    } else {
        Transition::None
    }
}

/// Position whose transient expanded sub-state must be force-closed when the
/// child at `new_active` becomes active: its immediate predecessor.
///
/// Closing it prevents stale expanded state from reappearing if the user
/// navigates back.
pub fn collapse_target(new_active: usize) -> Option<usize> {
    new_active.checked_sub(1)
}
