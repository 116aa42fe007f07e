// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node storage: authoritative local state and resolved outputs.

use kurbo::{Point, Rect, Size, Vec2};
use orrery_hit::RotatedRect;
use smallvec::SmallVec;

use crate::color::Rgba8;
use crate::observer::Observers;
use crate::types::{DirtyFlags, NodeFlags, NodeId, NodeKind};
use crate::unit::UnitValue;

/// Caller-authored state of a node, relative to its parent.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Local {
    pub(crate) offset_x: UnitValue,
    pub(crate) offset_y: UnitValue,
    pub(crate) width: UnitValue,
    pub(crate) height: UnitValue,
    pub(crate) scale: Vec2,
    /// Radians.
    pub(crate) angle: f64,
    /// Fraction of own size.
    pub(crate) rotation_origin: Vec2,
    /// Fraction of own size subtracted from the anchor before placement.
    pub(crate) align: Vec2,
    pub(crate) opacity: f64,
    pub(crate) tint: Option<Rgba8>,
    pub(crate) depth: f64,
}

impl Local {
    pub(crate) fn for_kind(kind: NodeKind) -> Self {
        let mut local = Self {
            offset_x: UnitValue::ZERO,
            offset_y: UnitValue::ZERO,
            width: UnitValue::ZERO,
            height: UnitValue::ZERO,
            scale: Vec2::new(1.0, 1.0),
            angle: 0.0,
            rotation_origin: Vec2::ZERO,
            align: Vec2::ZERO,
            opacity: 1.0,
            tint: None,
            depth: 0.0,
        };
        if kind == NodeKind::Line {
            // The segment's start is the middle of its start edge, which is
            // also where it pivots.
            local.height = UnitValue::px(1.0);
            local.rotation_origin = Vec2::new(0.0, 0.5);
            local.align = Vec2::new(0.0, 0.5);
        }
        local
    }
}

/// World-space outputs of a node, as of its last resolution.
///
/// `origin` is the un-rotated top-left corner; the node is drawn rotated by
/// `angle` about `pivot`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    /// Un-rotated top-left corner.
    pub origin: Point,
    /// Own size times cumulative scale.
    pub size: Size,
    /// Own size before scaling; the reference extent for percent-sized children.
    pub base_size: Size,
    /// Cumulative scale.
    pub scale: Vec2,
    /// Cumulative rotation in radians.
    pub angle: f64,
    /// Absolute rotation pivot. Children orbit around it.
    pub pivot: Point,
    /// Cumulative opacity.
    pub opacity: f64,
    /// Inherited tint; `None` means untinted.
    pub tint: Option<Rgba8>,
}

impl Default for Resolved {
    fn default() -> Self {
        Self {
            origin: Point::ORIGIN,
            size: Size::ZERO,
            base_size: Size::ZERO,
            scale: Vec2::new(1.0, 1.0),
            angle: 0.0,
            pivot: Point::ORIGIN,
            opacity: 1.0,
            tint: None,
        }
    }
}

impl Resolved {
    /// Un-rotated bounds.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Bounds together with the rotation applied when drawing.
    pub fn rotated_rect(&self) -> RotatedRect {
        RotatedRect::new(self.bounds(), self.pivot, self.angle)
    }
}

/// Hover/press state remembered from the previous frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InteractionState {
    pub(crate) hovered: bool,
    /// A press began over the node and the pointer has not left since.
    pub(crate) pressed: bool,
    /// Primary button state seen by this node last frame, inside or not.
    pub(crate) button_down: bool,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) kind: NodeKind,
    pub(crate) flags: NodeFlags,
    pub(crate) local: Local,
    pub(crate) resolved: Resolved,
    pub(crate) dirty: DirtyFlags,
    pub(crate) interaction: InteractionState,
    pub(crate) observers: Observers,
}

impl Node {
    pub(crate) fn new(generation: u32, kind: NodeKind) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            kind,
            flags: NodeFlags::default(),
            local: Local::for_kind(kind),
            resolved: Resolved::default(),
            dirty: DirtyFlags::all(),
            interaction: InteractionState::default(),
            observers: Observers::default(),
        }
    }

    /// Visible with non-zero resolved opacity. A node that is not shown hides
    /// its whole subtree from render and hit testing.
    pub(crate) fn is_shown(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE) && self.resolved.opacity > 0.0
    }
}
