// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, and node kinds.

/// Identifier for a node in the tree (generational).
///
/// A slot may be reused after its node is disposed, but the generation is
/// bumped, so a given `NodeId` never refers to two different nodes.
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

bitflags::bitflags! {
    /// Node flags controlling visibility and interaction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn by [`Tree::render`](crate::Tree::render) and can be hovered.
        const VISIBLE     = 0b0000_0001;
        /// Node takes part in hover/press evaluation during update.
        const INTERACTIVE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Per-property staleness of a node's resolved outputs.
    ///
    /// All flags are set on a freshly inserted node. A flag is cleared only by
    /// its resolver and set again by a local mutation, a reparent, or the
    /// parent resolving the same property.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// Scale and size outputs are stale.
        const SIZE     = 0b0000_0001;
        /// Angle, position, and rotation pivot outputs are stale.
        const POSITION = 0b0000_0010;
        /// Cumulative opacity is stale.
        const OPACITY  = 0b0000_0100;
        /// Inherited tint is stale.
        const COLOR    = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// Optional behaviors a [`NodeKind`] opts into.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The rotation origin may be changed by callers.
        const ROTATION_ORIGIN = 0b0000_0001;
        /// Geometry can be described by two endpoints.
        const ENDPOINTS       = 0b0000_0010;
    }
}

/// The shape a node represents.
///
/// All kinds share one resolution core; the kind only selects the hit-test
/// shape, the default local state, and which [`Capabilities`] are available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Groups children; draws nothing itself. Hit tests its axis-aligned box.
    #[default]
    Container,
    /// Filled rectangle. Hit tests honor rotation.
    Box,
    /// Ellipse inscribed in the node's box. Hit tests honor rotation.
    Circle,
    /// Straight segment. Width is its length, height its thickness, and it
    /// always pivots around the middle of its start edge.
    Line,
}

impl NodeKind {
    /// Behaviors supported by this kind.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Container | Self::Box | Self::Circle => Capabilities::ROTATION_ORIGIN,
            Self::Line => Capabilities::ENDPOINTS,
        }
    }

    /// Returns `true` if this kind supports every behavior in `caps`.
    pub const fn supports(self, caps: Capabilities) -> bool {
        self.capabilities().contains(caps)
    }
}

/// How far an [`update`](crate::Tree::update) or [`render`](crate::Tree::render)
/// pass reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateScope {
    /// The node and all of its descendants.
    #[default]
    Subtree,
    /// Only the given node; callers drive traversal themselves.
    NodeOnly,
}
