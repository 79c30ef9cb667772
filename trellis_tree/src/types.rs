// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the widget tree: node identifiers, tags, and the per-child
//! configuration surface.

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` stays valid until its node is removed. After removal the slot may
/// be reused; the bumped generation makes the old handle stale, and every
/// [`Tree`](crate::Tree) operation absorbs stale handles instead of panicking.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Symbol-like identifier for an element kind (the analog of a tag name).
///
/// The host owns the meaning and lifecycle of individual tags, typically via
/// static constants or an interned table. Discovery matches nodes by `Tag`
/// equality; it never inspects anything else about a node's kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

bitflags::bitflags! {
    /// Role flags a parent projects onto each of its logical children.
    ///
    /// Children read these flags to drive their own presentation; they never
    /// write them. `EXPANDED` is the one transient sub-state a child may carry
    /// (an open disclosure, say) that the projector forcibly clears on the
    /// child preceding a newly active one, so stale expansion cannot reappear
    /// when the user navigates back.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RoleFlags: u8 {
        /// Child is the (or an) active member of its composite.
        const ACTIVE    = 0b0000_0001;
        /// Child participates in rendering.
        const VISIBLE   = 0b0000_0010;
        /// Child should present a back/return control.
        const SHOW_BACK = 0b0000_0100;
        /// Child may be dismissed by the user.
        const CLOSABLE  = 0b0000_1000;
        /// Child's transient open/expanded sub-state.
        const EXPANDED  = 0b0001_0000;
    }
}

impl Default for RoleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-child configuration surface, written only by the owning parent during a
/// projection cycle and read by the child.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildConfig {
    /// Index among logical siblings, assigned at discovery time.
    /// Contiguous from 0 in document order, fully recomputed every cycle.
    pub position: u32,
    /// Projected role flags.
    pub flags: RoleFlags,
}

/// Per-node payload: the element kind plus its configuration surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeData {
    /// Element kind. Fixed at insertion.
    pub tag: Tag,
    /// Configuration written by the owning parent.
    pub config: ChildConfig,
}

impl NodeData {
    /// Payload for a freshly inserted node with a default configuration.
    pub const fn new(tag: Tag) -> Self {
        Self {
            tag,
            config: ChildConfig {
                position: 0,
                flags: RoleFlags::empty(),
            },
        }
    }
}
