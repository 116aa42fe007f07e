// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning resolved outputs into draw calls.

use alloc::vec::Vec;
use kurbo::{Point, Rect};

use crate::color::Rgba8;
use crate::tree::Tree;
use crate::types::{NodeId, NodeKind, UpdateScope};

/// One primitive to draw, taken from a node's resolved outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    /// Source node.
    pub node: NodeId,
    /// Shape to draw inside `bounds`.
    pub kind: NodeKind,
    /// Un-rotated bounds in viewport pixels.
    pub bounds: Rect,
    /// Point `bounds` is rotated about.
    pub pivot: Point,
    /// Rotation in radians.
    pub angle: f64,
    /// Cumulative opacity, greater than zero.
    pub opacity: f64,
    /// Inherited tint, if any.
    pub tint: Option<Rgba8>,
    /// Draw-order hint in `[0, 1]`; sinks may sort on it.
    pub depth: f64,
}

/// Receiver of draw items produced by [`Tree::render`].
pub trait RenderSink {
    /// Called once before the items of a frame, with the frame delta in seconds.
    fn begin_frame(&mut self, delta: f64) {
        let _ = delta;
    }

    /// Draw one item. Items arrive parents first, siblings in child order.
    fn draw(&mut self, item: &DrawItem);
}

impl RenderSink for Vec<DrawItem> {
    fn draw(&mut self, item: &DrawItem) {
        self.push(*item);
    }
}

impl Tree {
    /// Emit draw items for `id` (and its descendants with
    /// [`UpdateScope::Subtree`]) from their last resolved outputs.
    ///
    /// Invisible nodes and nodes with zero resolved opacity are skipped along
    /// with their subtrees; rendering a node under such an ancestor emits
    /// nothing. Containers and zero-area nodes draw nothing
    /// themselves but their children are still visited.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn render(
        &self,
        id: NodeId,
        sink: &mut impl RenderSink,
        delta: f64,
        scope: UpdateScope,
    ) {
        assert!(self.is_alive(id), "dangling NodeId");
        sink.begin_frame(delta);
        if self.hidden_by_ancestors(id) {
            return;
        }
        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if !node.is_shown() {
                continue;
            }
            let resolved = &node.resolved;
            if node.kind != NodeKind::Container && resolved.bounds().area() > 0.0 {
                sink.draw(&DrawItem {
                    node: current,
                    kind: node.kind,
                    bounds: resolved.bounds(),
                    pivot: resolved.pivot,
                    angle: resolved.angle,
                    opacity: resolved.opacity,
                    tint: resolved.tint,
                    depth: node.local.depth,
                });
            }
            if scope == UpdateScope::Subtree {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// Un-rotated bounds of a live node as of its last update.
    pub fn render_bounds(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.resolved.bounds())
    }

    /// Absolute rotation pivot of a live node as of its last update.
    pub fn render_pivot(&self, id: NodeId) -> Option<Point> {
        self.node_opt(id).map(|n| n.resolved.pivot)
    }
}
