// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-flag driven resolution of world-space outputs.
//!
//! Each resolver computes one output from the parent's resolved output and the
//! node's local state, notifies the matching observers, marks the same flag on
//! every direct child, and clears its own flag. [`Tree::update`] runs the
//! resolvers of a node before descending, so a child always reads outputs its
//! parent produced in the same pass.

use alloc::vec::Vec;
use kurbo::{Point, Size, Vec2};
use log::trace;

use crate::color::inherit_tint;
use crate::interaction::FrameContext;
use crate::node::Resolved;
use crate::observer::NodeEvent;
use crate::tree::Tree;
use crate::types::{DirtyFlags, NodeId, UpdateScope};

/// Place a node given its parent's outputs.
///
/// `local_offset` is the node's offset already resolved to pixels, `size` its
/// scaled size. Returns the un-rotated origin and the absolute pivot.
///
/// The node is first placed as if the parent were unrotated: the offset is
/// scaled by the parent's scale and shifted by the alignment origin. If the
/// parent is rotated, the node's pivot is then orbited around the parent's
/// pivot by the parent's angle.
pub fn compose_position(
    parent: Option<&Resolved>,
    local_offset: Vec2,
    size: Size,
    align: Vec2,
    rotation_origin: Vec2,
) -> (Point, Point) {
    let (anchor, parent_scale) = match parent {
        Some(p) => (p.origin, p.scale),
        None => (Point::ORIGIN, Vec2::new(1.0, 1.0)),
    };
    let mut origin = Point::new(
        anchor.x + local_offset.x * parent_scale.x - align.x * size.width,
        anchor.y + local_offset.y * parent_scale.y - align.y * size.height,
    );
    let pivot_in_box = Vec2::new(
        rotation_origin.x * size.width,
        rotation_origin.y * size.height,
    );
    if let Some(p) = parent.filter(|p| p.angle != 0.0) {
        let from_parent = (origin + pivot_in_box) - p.pivot;
        let radius = from_parent.hypot();
        let orbited = Vec2::from_angle(p.angle + from_parent.atan2()) * radius;
        origin += orbited - from_parent;
    }
    (origin, origin + pivot_in_box)
}

#[derive(Clone, Copy, Debug)]
enum Visit {
    Enter(NodeId, bool),
    Exit(NodeId, bool),
}

impl Tree {
    /// Resolve `id` (and, with [`UpdateScope::Subtree`], its descendants) for
    /// one frame.
    ///
    /// The frame's viewport is applied first. Each visited node runs only the
    /// resolvers whose dirty flag is set, in the order color, opacity, size,
    /// position; its children are visited afterwards. Hover and press events
    /// are evaluated for a node once its whole subtree has been resolved.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn update(&mut self, id: NodeId, frame: &FrameContext, scope: UpdateScope) {
        assert!(self.is_alive(id), "dangling NodeId");
        self.set_viewport(frame.viewport);

        // The flag carried with each visit: some proper ancestor is not shown.
        let mut stack = alloc::vec![Visit::Enter(id, self.hidden_by_ancestors(id))];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(node, hidden) => {
                    self.resolve_dirty(node);
                    stack.push(Visit::Exit(node, hidden));
                    if scope == UpdateScope::Subtree {
                        let n = self.node(node);
                        let hide_children = hidden || !n.is_shown();
                        stack.extend(
                            n.children
                                .iter()
                                .rev()
                                .map(|&c| Visit::Enter(c, hide_children)),
                        );
                    }
                }
                Visit::Exit(node, hidden) => {
                    self.update_interaction(node, &frame.pointer, hidden);
                }
            }
        }
    }

    /// Update every root subtree, in slot order.
    pub fn update_roots(&mut self, frame: &FrameContext) {
        self.set_viewport(frame.viewport);
        let roots: Vec<_> = self.roots();
        for root in roots {
            self.update(root, frame, UpdateScope::Subtree);
        }
    }

    fn resolve_dirty(&mut self, id: NodeId) {
        let dirty = self.node(id).dirty;
        if dirty.is_empty() {
            return;
        }
        trace!("resolving {id:?}: {dirty:?}");
        if dirty.contains(DirtyFlags::COLOR) {
            self.resolve_color(id);
        }
        if dirty.contains(DirtyFlags::OPACITY) {
            self.resolve_opacity(id);
        }
        if dirty.contains(DirtyFlags::SIZE) {
            self.resolve_size(id);
        }
        if dirty.contains(DirtyFlags::POSITION) {
            self.resolve_position(id);
        }
    }

    fn parent_resolved(&self, id: NodeId) -> Option<Resolved> {
        self.node(id).parent.map(|p| self.node(p).resolved)
    }

    fn resolve_color(&mut self, id: NodeId) {
        let parent = self.parent_resolved(id).and_then(|p| p.tint);
        let node = self.node_mut(id);
        node.resolved.tint = inherit_tint(parent, node.local.tint);
        self.finish(id, DirtyFlags::COLOR, NodeEvent::ColorChange);
    }

    fn resolve_opacity(&mut self, id: NodeId) {
        let parent = self.parent_resolved(id).map_or(1.0, |p| p.opacity);
        let node = self.node_mut(id);
        node.resolved.opacity = parent * node.local.opacity;
        self.finish(id, DirtyFlags::OPACITY, NodeEvent::OpacityChange);
    }

    fn resolve_size(&mut self, id: NodeId) {
        let parent = self.parent_resolved(id);
        let extent = parent.map_or(self.viewport, |p| p.base_size);
        let parent_scale = parent.map_or(Vec2::new(1.0, 1.0), |p| p.scale);
        let node = self.node_mut(id);
        let local = &node.local;
        let scale = Vec2::new(parent_scale.x * local.scale.x, parent_scale.y * local.scale.y);
        let base = Size::new(
            local.width.resolve(extent.width),
            local.height.resolve(extent.height),
        );
        node.resolved.scale = scale;
        node.resolved.base_size = base;
        node.resolved.size = Size::new(base.width * scale.x, base.height * scale.y);
        self.finish(id, DirtyFlags::SIZE, NodeEvent::SizeChange);
    }

    fn resolve_position(&mut self, id: NodeId) {
        let parent = self.parent_resolved(id);
        let extent = parent.map_or(self.viewport, |p| p.base_size);
        let node = self.node_mut(id);
        let local = &node.local;
        let offset = Vec2::new(
            local.offset_x.resolve(extent.width),
            local.offset_y.resolve(extent.height),
        );
        let (origin, pivot) = compose_position(
            parent.as_ref(),
            offset,
            node.resolved.size,
            local.align,
            local.rotation_origin,
        );
        node.resolved.angle = parent.map_or(0.0, |p| p.angle) + local.angle;
        node.resolved.origin = origin;
        node.resolved.pivot = pivot;
        self.finish(id, DirtyFlags::POSITION, NodeEvent::PositionChange);
    }

    /// Notify observers, push `flag` down one level and clear it here.
    fn finish(&mut self, id: NodeId, flag: DirtyFlags, event: NodeEvent) {
        let node = self.node_mut(id);
        node.observers.emit(event);
        node.dirty.remove(flag);
        let children = node.children.clone();
        for child in children {
            self.node_mut(child).dirty |= flag;
        }
    }
}
